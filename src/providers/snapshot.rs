//! File-backed provider.
//!
//! [`SnapshotInfoer`] serves a provider catalogue from a JSON snapshot on
//! disk. The file is re-read on every call, so replacing it between scrape
//! cycles is picked up by the next cycle without a restart.
//!
//! ```json
//! {
//!   "shortLivedPrices": true,
//!   "hasImages": false,
//!   "regions": [
//!     {
//!       "id": "eu-west-1",
//!       "name": "EU (Ireland)",
//!       "zones": ["eu-west-1a", "eu-west-1b"],
//!       "prices": { "m5.large": { "onDemandPrice": 0.107, "spotPrice": { "eu-west-1a": 0.03 } } },
//!       "services": {
//!         "compute": {
//!           "vms": [{ "type": "m5.large", "cpusPerVm": 2, "memPerVm": 8 }],
//!           "versions": []
//!         }
//!       }
//!     }
//!   ]
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CloudInfoer;
use crate::error::{CloudInfoError, Result};
use crate::types::{Image, LocationVersion, Price, PriceBaseline, RegionMap, VmInfo};

/// Catalogue of one provider as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSnapshot {
    #[serde(default)]
    pub short_lived_prices: bool,
    #[serde(default)]
    pub has_images: bool,
    #[serde(default)]
    pub regions: Vec<RegionSnapshot>,
}

/// One region of a [`ProviderSnapshot`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub zones: Vec<String>,
    /// Instance type → price.
    #[serde(default)]
    pub prices: HashMap<String, Price>,
    /// Service name → what the service offers in this region.
    #[serde(default)]
    pub services: BTreeMap<String, ServiceSnapshot>,
}

/// Products, images and versions of one service in one region.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSnapshot {
    #[serde(default)]
    pub vms: Vec<VmInfo>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub versions: Vec<LocationVersion>,
}

impl ProviderSnapshot {
    /// Parse a snapshot from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CloudInfoError::Provider(format!(
                "failed to read snapshot {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            CloudInfoError::Provider(format!(
                "corrupt snapshot {}: {e}",
                path.display()
            ))
        })
    }

    fn region(&self, id: &str) -> Result<&RegionSnapshot> {
        self.regions
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| CloudInfoError::Provider(format!("unknown region: {id}")))
    }

    fn service(&self, service: &str, region: &str) -> Result<&ServiceSnapshot> {
        self.region(region)?.services.get(service).ok_or_else(|| {
            CloudInfoError::Provider(format!(
                "service {service} not offered in region {region}"
            ))
        })
    }
}

/// [`CloudInfoer`] reading a [`ProviderSnapshot`] from disk.
#[derive(Debug, Clone)]
pub struct SnapshotInfoer {
    path: PathBuf,
}

impl SnapshotInfoer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn snapshot(&self) -> Result<ProviderSnapshot> {
        debug!(path = %self.path.display(), "reading provider snapshot");
        ProviderSnapshot::load(&self.path)
    }

    /// Capability flags; a missing or corrupt file reports none.
    fn flags(&self) -> (bool, bool) {
        self.snapshot()
            .map(|s| (s.short_lived_prices, s.has_images))
            .unwrap_or_default()
    }
}

#[async_trait]
impl CloudInfoer for SnapshotInfoer {
    async fn initialize(&self) -> Result<PriceBaseline> {
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .regions
            .into_iter()
            .map(|r| (r.id, r.prices))
            .collect())
    }

    async fn get_virtual_machines(&self, region: &str) -> Result<Vec<VmInfo>> {
        let snapshot = self.snapshot()?;
        let mut vms: Vec<VmInfo> = Vec::new();
        for service in snapshot.region(region)?.services.values() {
            for vm in &service.vms {
                if !vms.iter().any(|v| v.instance_type == vm.instance_type) {
                    vms.push(vm.clone());
                }
            }
        }
        Ok(vms)
    }

    async fn get_products(
        &self,
        _cached: &[VmInfo],
        service: &str,
        region: &str,
    ) -> Result<Vec<VmInfo>> {
        Ok(self.snapshot()?.service(service, region)?.vms.clone())
    }

    async fn get_regions(&self, service: &str) -> Result<RegionMap> {
        Ok(self
            .snapshot()?
            .regions
            .into_iter()
            .filter(|r| r.services.contains_key(service))
            .map(|r| (r.id, r.name))
            .collect())
    }

    async fn get_zones(&self, region: &str) -> Result<Vec<String>> {
        Ok(self.snapshot()?.region(region)?.zones.clone())
    }

    async fn get_current_prices(&self, region: &str) -> Result<HashMap<String, Price>> {
        let snapshot = self.snapshot()?;
        if !snapshot.short_lived_prices {
            return Err(CloudInfoError::NotImplemented("get_current_prices"));
        }
        Ok(snapshot.region(region)?.prices.clone())
    }

    async fn get_service_images(&self, service: &str, region: &str) -> Result<Vec<Image>> {
        Ok(self.snapshot()?.service(service, region)?.images.clone())
    }

    async fn get_versions(&self, service: &str, region: &str) -> Result<Vec<LocationVersion>> {
        Ok(self.snapshot()?.service(service, region)?.versions.clone())
    }

    fn has_short_lived_price_info(&self) -> bool {
        self.flags().0
    }

    fn has_images(&self) -> bool {
        self.flags().1
    }
}

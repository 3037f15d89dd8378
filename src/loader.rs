//! Static service data import.
//!
//! Static services are never scraped. Their regions, zones, products,
//! prices, images and versions come from a JSON data file that is imported
//! into the same store the scraper writes to. Products go through the same
//! price merge as scraped ones, so only positively priced VMs are stored.
//!
//! Imported entries age out of the store like scraped ones do, so static
//! sources are re-imported on a schedule with [`StaticDataLoader::schedule`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{CloudInfoError, Result};
use crate::executor::PeriodicExecutor;
use crate::scrape::merge_prices;
use crate::store::CloudInfoStore;
use crate::types::{Image, LocationVersion, Price, RegionMap, VmInfo};

/// Contents of a static service data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceData {
    pub provider: String,
    pub service: String,
    #[serde(default)]
    pub regions: Vec<RegionData>,
}

/// One region of a [`ServiceData`] file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionData {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    /// Supported versions; the first one is the default.
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub vms: Vec<VmInfo>,
    #[serde(default)]
    pub prices: Vec<PriceData>,
}

/// Price of one instance type in a [`RegionData`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceData {
    pub instance_type: String,
    pub price: Price,
}

/// What a load wrote to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub regions: usize,
    pub vms: usize,
    pub dropped_vms: usize,
}

/// A static service and the data file it is imported from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSource {
    pub provider: String,
    pub service: String,
    pub path: PathBuf,
}

impl StaticSource {
    pub fn new(
        provider: impl Into<String>,
        service: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider: provider.into(),
            service: service.into(),
            path: path.into(),
        }
    }
}

/// Imports [`ServiceData`] into a [`CloudInfoStore`].
#[derive(Clone)]
pub struct StaticDataLoader {
    store: Arc<dyn CloudInfoStore>,
}

impl StaticDataLoader {
    pub fn new(store: Arc<dyn CloudInfoStore>) -> Self {
        Self { store }
    }

    /// Read a data file and import it.
    ///
    /// `provider` and `service` must match the ones declared in the file.
    pub fn load_file(&self, provider: &str, service: &str, path: &Path) -> Result<LoadSummary> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CloudInfoError::Configuration(format!(
                "failed to read service data {}: {e}",
                path.display()
            ))
        })?;
        let data: ServiceData = serde_json::from_str(&content)?;
        if data.provider != provider || data.service != service {
            return Err(CloudInfoError::Configuration(format!(
                "data file {} describes {}/{}, expected {provider}/{service}",
                path.display(),
                data.provider,
                data.service
            )));
        }
        Ok(self.load(data))
    }

    /// Import every source. Failures are logged and skipped.
    ///
    /// Returns the number of sources that were imported.
    pub fn load_sources(&self, sources: &[StaticSource]) -> usize {
        let mut loaded = 0;
        for source in sources {
            match self.load_file(&source.provider, &source.service, &source.path) {
                Ok(summary) => {
                    loaded += 1;
                    info!(
                        provider = %source.provider,
                        service = %source.service,
                        regions = summary.regions,
                        vms = summary.vms,
                        "static service loaded"
                    );
                }
                Err(e) => warn!(
                    provider = %source.provider,
                    service = %source.service,
                    error = %e,
                    "static service not loaded"
                ),
            }
        }
        loaded
    }

    /// Import `sources` now and again every `interval` until `cancel` fires.
    ///
    /// `interval` must be shorter than the store TTL for imported data to
    /// stay readable.
    pub fn schedule(
        &self,
        sources: Vec<StaticSource>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Result<JoinHandle<()>> {
        let loader = self.clone();
        let sources = Arc::new(sources);
        PeriodicExecutor::new(interval).execute(cancel, move |_| {
            loader.load_sources(&sources);
            async {}
        })
    }

    /// Import service data into the store.
    pub fn load(&self, data: ServiceData) -> LoadSummary {
        let ServiceData {
            provider,
            service,
            regions,
        } = data;
        info!(%provider, %service, regions = regions.len(), "loading static service data");

        let region_map: RegionMap = regions
            .iter()
            .map(|r| (r.id.clone(), r.name.clone()))
            .collect();
        self.store.replace_regions(&provider, &service, region_map);

        let mut summary = LoadSummary {
            regions: regions.len(),
            ..Default::default()
        };
        for region in regions {
            for PriceData {
                instance_type,
                price,
            } in region.prices
            {
                self.store
                    .store_price(&provider, &region.id, &instance_type, price);
            }

            let fetched = region.vms.len();
            let vms = merge_prices(self.store.as_ref(), &provider, &region.id, region.vms);
            if vms.len() < fetched {
                warn!(
                    %provider,
                    %service,
                    region = %region.id,
                    dropped = fetched - vms.len(),
                    "static VMs without price dropped"
                );
            }
            summary.vms += vms.len();
            summary.dropped_vms += fetched - vms.len();

            let versions = if region.versions.is_empty() {
                Vec::new()
            } else {
                vec![LocationVersion::new(region.id.clone(), region.versions, "")]
            };

            self.store
                .replace_zones(&provider, &service, &region.id, region.zones);
            self.store
                .replace_vms(&provider, &service, &region.id, vms);
            self.store
                .replace_images(&provider, &service, &region.id, region.images);
            self.store
                .replace_versions(&provider, &service, &region.id, versions);
        }

        info!(
            %provider,
            %service,
            vms = summary.vms,
            "static service data loaded"
        );
        summary
    }
}

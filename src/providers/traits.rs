//! The per-provider data source contract.
//!
//! One [`CloudInfoer`] exists per cloud provider. It knows how to talk to
//! that provider's APIs and maps the results onto the crate's data model.
//! Implementations own their own timeout and retry discipline; the scraper
//! never cancels an in-flight call.
//!
//! Optional capabilities have default implementations returning
//! [`CloudInfoError::NotImplemented`]. The scraper only calls them when the
//! matching capability flag ([`has_images`](CloudInfoer::has_images),
//! [`has_short_lived_price_info`](CloudInfoer::has_short_lived_price_info))
//! is set.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{CloudInfoError, Result};
use crate::types::{Image, LocationVersion, Price, PriceBaseline, RegionMap, VmInfo};

/// Data source for one cloud provider.
#[async_trait]
pub trait CloudInfoer: Send + Sync {
    /// Download the provider-wide on-demand price baseline.
    ///
    /// Called once at the start of every full scrape cycle; may be expensive.
    async fn initialize(&self) -> Result<PriceBaseline>;

    /// Virtual machines available in a region.
    async fn get_virtual_machines(&self, _region: &str) -> Result<Vec<VmInfo>> {
        Err(CloudInfoError::NotImplemented("get_virtual_machines"))
    }

    /// Products of `service` in `region`.
    ///
    /// `cached` is the VM collection currently in the store (possibly empty);
    /// implementations may diff against it instead of re-fetching everything.
    async fn get_products(&self, cached: &[VmInfo], service: &str, region: &str)
    -> Result<Vec<VmInfo>>;

    /// Regions in which `service` is available.
    async fn get_regions(&self, service: &str) -> Result<RegionMap>;

    /// Availability zones of a region.
    async fn get_zones(&self, region: &str) -> Result<Vec<String>>;

    /// Current (short-lived) prices in a region, keyed by instance type.
    async fn get_current_prices(&self, _region: &str) -> Result<HashMap<String, Price>> {
        Err(CloudInfoError::NotImplemented("get_current_prices"))
    }

    /// Images supported by `service` in `region`.
    async fn get_service_images(&self, _service: &str, _region: &str) -> Result<Vec<Image>> {
        Err(CloudInfoError::NotImplemented("get_service_images"))
    }

    /// Versions of `service` supported in `region`.
    async fn get_versions(&self, service: &str, region: &str) -> Result<Vec<LocationVersion>>;

    /// Whether prices change fast enough to need the short-lived refresh loop.
    fn has_short_lived_price_info(&self) -> bool {
        false
    }

    /// Whether the provider exposes service images.
    fn has_images(&self) -> bool {
        false
    }
}

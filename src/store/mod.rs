//! Cloud information store.
//!
//! The store is the only synchronization point between the scraping (write)
//! path and the facade/query (read) path. Every category is keyed by the
//! (provider, service, region) tuple it belongs to; see [`keys`].
//!
//! Collections are written with a single `replace_*` call. There is no
//! delete-then-store window in which a reader could observe an empty
//! collection. Prices are the exception: they are written one instance type
//! at a time and never removed wholesale.
//!
//! Implementations must be safe for concurrent access from arbitrary tasks.
//! Concurrent writers to the same key are resolved last-write-wins.

pub mod keys;
mod memory;

pub use memory::{InMemoryStore, StoreConfig};

use crate::types::{Image, LocationVersion, Price, RegionMap, Service, VmInfo};

/// Key/value store for scraped cloud information.
///
/// Getters return `None` when nothing has been cached yet for the key.
pub trait CloudInfoStore: Send + Sync {
    // Services (configuration-owned)
    fn store_services(&self, provider: &str, services: Vec<Service>);
    fn get_services(&self, provider: &str) -> Option<Vec<Service>>;

    // Regions
    fn replace_regions(&self, provider: &str, service: &str, regions: RegionMap);
    fn get_regions(&self, provider: &str, service: &str) -> Option<RegionMap>;
    fn delete_regions(&self, provider: &str, service: &str);

    // Zones
    fn replace_zones(&self, provider: &str, service: &str, region: &str, zones: Vec<String>);
    fn get_zones(&self, provider: &str, service: &str, region: &str) -> Option<Vec<String>>;
    fn delete_zones(&self, provider: &str, service: &str, region: &str);

    // Prices
    fn store_price(&self, provider: &str, region: &str, instance_type: &str, price: Price);
    fn get_price(&self, provider: &str, region: &str, instance_type: &str) -> Option<Price>;

    // Virtual machines
    fn replace_vms(&self, provider: &str, service: &str, region: &str, vms: Vec<VmInfo>);
    fn get_vms(&self, provider: &str, service: &str, region: &str) -> Option<Vec<VmInfo>>;
    fn delete_vms(&self, provider: &str, service: &str, region: &str);

    // Images
    fn replace_images(&self, provider: &str, service: &str, region: &str, images: Vec<Image>);
    fn get_images(&self, provider: &str, service: &str, region: &str) -> Option<Vec<Image>>;
    fn delete_images(&self, provider: &str, service: &str, region: &str);

    // Versions
    fn replace_versions(
        &self,
        provider: &str,
        service: &str,
        region: &str,
        versions: Vec<LocationVersion>,
    );
    fn get_versions(
        &self,
        provider: &str,
        service: &str,
        region: &str,
    ) -> Option<Vec<LocationVersion>>;
    fn delete_versions(&self, provider: &str, service: &str, region: &str);

    // Status
    fn store_status(&self, provider: &str, status: String);
    fn get_status(&self, provider: &str) -> Option<String>;
}

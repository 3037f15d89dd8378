//! In-memory store backed by moka.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use super::{CloudInfoStore, keys};
use crate::types::{Image, LocationVersion, Price, RegionMap, Service, VmInfo};

/// Configuration for [`InMemoryStore`].
///
/// ```rust
/// # use cloudinfo::StoreConfig;
/// # use std::time::Duration;
/// let config = StoreConfig::new()
///     .max_entries(100_000)
///     .ttl(Duration::from_secs(72 * 3600));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of cached entries. Default: 500,000.
    pub max_entries: u64,
    /// Time-to-live for scraped entries. Default: 48 hours.
    ///
    /// Must exceed the renewal interval, otherwise data expires between
    /// scrape cycles and reads fall back to "not yet cached".
    pub ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_entries: 500_000,
            ttl: Duration::from_secs(48 * 3600),
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for scraped entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Cached value. Collections sit behind `Arc` so cache reads stay cheap.
#[derive(Clone, Debug)]
enum Entry {
    Regions(Arc<RegionMap>),
    Zones(Arc<Vec<String>>),
    Price(Arc<Price>),
    Vms(Arc<Vec<VmInfo>>),
    Images(Arc<Vec<Image>>),
    Versions(Arc<Vec<LocationVersion>>),
    Status(Arc<str>),
}

/// Thread-safe [`CloudInfoStore`] holding everything in process memory.
///
/// Scraped data expires after [`StoreConfig::ttl`]. The services registry
/// comes from configuration and is kept in a separate, non-expiring map.
pub struct InMemoryStore {
    entries: Cache<String, Entry>,
    services: Cache<String, Arc<Vec<Service>>>,
}

impl InMemoryStore {
    pub fn new(config: &StoreConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self {
            entries,
            services: Cache::new(1_000),
        }
    }

    /// Number of scraped entries currently cached (approximate).
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Whether no scraped entries are cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict all scraped entries. The services registry is kept.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    fn get(&self, key: &str) -> Option<Entry> {
        self.entries.get(key)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("entries", &self.entries.entry_count())
            .field("providers", &self.services.entry_count())
            .finish()
    }
}

impl CloudInfoStore for InMemoryStore {
    fn store_services(&self, provider: &str, services: Vec<Service>) {
        self.services
            .insert(keys::services(provider), Arc::new(services));
    }

    fn get_services(&self, provider: &str) -> Option<Vec<Service>> {
        self.services
            .get(&keys::services(provider))
            .map(|s| s.as_ref().clone())
    }

    fn replace_regions(&self, provider: &str, service: &str, regions: RegionMap) {
        self.entries.insert(
            keys::regions(provider, service),
            Entry::Regions(Arc::new(regions)),
        );
    }

    fn get_regions(&self, provider: &str, service: &str) -> Option<RegionMap> {
        match self.get(&keys::regions(provider, service))? {
            Entry::Regions(r) => Some(r.as_ref().clone()),
            _ => None,
        }
    }

    fn delete_regions(&self, provider: &str, service: &str) {
        self.entries.invalidate(&keys::regions(provider, service));
    }

    fn replace_zones(&self, provider: &str, service: &str, region: &str, zones: Vec<String>) {
        self.entries.insert(
            keys::zones(provider, service, region),
            Entry::Zones(Arc::new(zones)),
        );
    }

    fn get_zones(&self, provider: &str, service: &str, region: &str) -> Option<Vec<String>> {
        match self.get(&keys::zones(provider, service, region))? {
            Entry::Zones(z) => Some(z.as_ref().clone()),
            _ => None,
        }
    }

    fn delete_zones(&self, provider: &str, service: &str, region: &str) {
        self.entries
            .invalidate(&keys::zones(provider, service, region));
    }

    fn store_price(&self, provider: &str, region: &str, instance_type: &str, price: Price) {
        self.entries.insert(
            keys::price(provider, region, instance_type),
            Entry::Price(Arc::new(price)),
        );
    }

    fn get_price(&self, provider: &str, region: &str, instance_type: &str) -> Option<Price> {
        match self.get(&keys::price(provider, region, instance_type))? {
            Entry::Price(p) => Some(p.as_ref().clone()),
            _ => None,
        }
    }

    fn replace_vms(&self, provider: &str, service: &str, region: &str, vms: Vec<VmInfo>) {
        self.entries.insert(
            keys::vms(provider, service, region),
            Entry::Vms(Arc::new(vms)),
        );
    }

    fn get_vms(&self, provider: &str, service: &str, region: &str) -> Option<Vec<VmInfo>> {
        match self.get(&keys::vms(provider, service, region))? {
            Entry::Vms(v) => Some(v.as_ref().clone()),
            _ => None,
        }
    }

    fn delete_vms(&self, provider: &str, service: &str, region: &str) {
        self.entries.invalidate(&keys::vms(provider, service, region));
    }

    fn replace_images(&self, provider: &str, service: &str, region: &str, images: Vec<Image>) {
        self.entries.insert(
            keys::images(provider, service, region),
            Entry::Images(Arc::new(images)),
        );
    }

    fn get_images(&self, provider: &str, service: &str, region: &str) -> Option<Vec<Image>> {
        match self.get(&keys::images(provider, service, region))? {
            Entry::Images(i) => Some(i.as_ref().clone()),
            _ => None,
        }
    }

    fn delete_images(&self, provider: &str, service: &str, region: &str) {
        self.entries
            .invalidate(&keys::images(provider, service, region));
    }

    fn replace_versions(
        &self,
        provider: &str,
        service: &str,
        region: &str,
        versions: Vec<LocationVersion>,
    ) {
        self.entries.insert(
            keys::versions(provider, service, region),
            Entry::Versions(Arc::new(versions)),
        );
    }

    fn get_versions(
        &self,
        provider: &str,
        service: &str,
        region: &str,
    ) -> Option<Vec<LocationVersion>> {
        match self.get(&keys::versions(provider, service, region))? {
            Entry::Versions(v) => Some(v.as_ref().clone()),
            _ => None,
        }
    }

    fn delete_versions(&self, provider: &str, service: &str, region: &str) {
        self.entries
            .invalidate(&keys::versions(provider, service, region));
    }

    fn store_status(&self, provider: &str, status: String) {
        self.entries
            .insert(keys::status(provider), Entry::Status(Arc::from(status)));
    }

    fn get_status(&self, provider: &str) -> Option<String> {
        match self.get(&keys::status(provider))? {
            Entry::Status(s) => Some(s.to_string()),
            _ => None,
        }
    }
}

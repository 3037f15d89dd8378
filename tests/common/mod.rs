//! Shared mocks for integration tests.
//!
//! [`MockInfoer`] serves an in-memory catalogue, records every call and can
//! be told to fail individual operations at runtime. The recording sinks
//! capture what the scraper reports.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;

use cloudinfo::scrape::Collaborators;
use cloudinfo::{
    CloudInfo, CloudInfoError, CloudInfoStore, CloudInfoer, ErrorHandler, EventBus, Image,
    InMemoryStore, LocationVersion, MetricsReporter, Price, PriceBaseline, RegionMap, Result,
    ScrapingManager, Service, VmInfo,
};

// ============================================================================
// Mock provider
// ============================================================================

/// Operation a [`MockInfoer`] can be told to fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Failure {
    Initialize,
    Regions(String),
    Zones(String),
    Products(String),
    Images(String),
    Versions(String),
    CurrentPrices(String),
}

#[derive(Default)]
struct Catalogue {
    regions: RegionMap,
    zones: HashMap<String, Vec<String>>,
    /// (service, region) → products
    products: BTreeMap<(String, String), Vec<VmInfo>>,
    baseline: PriceBaseline,
    current_prices: HashMap<String, HashMap<String, Price>>,
    images: HashMap<String, Vec<Image>>,
    versions: HashMap<String, Vec<String>>,
}

/// In-memory [`CloudInfoer`] with failure injection and call recording.
#[derive(Default)]
pub struct MockInfoer {
    catalogue: Mutex<Catalogue>,
    failures: Mutex<HashSet<Failure>>,
    calls: Mutex<Vec<String>>,
    short_lived: bool,
    images: bool,
}

impl MockInfoer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the short-lived price capability.
    pub fn short_lived(mut self) -> Self {
        self.short_lived = true;
        self
    }

    /// Enable the image capability.
    pub fn with_images(mut self) -> Self {
        self.images = true;
        self
    }

    pub fn region(self, id: &str, name: &str, zones: &[&str]) -> Self {
        {
            let mut catalogue = self.catalogue.lock().unwrap();
            catalogue.regions.insert(id.into(), name.into());
            catalogue
                .zones
                .insert(id.into(), zones.iter().map(|z| z.to_string()).collect());
        }
        self
    }

    pub fn product(self, service: &str, region: &str, vm: VmInfo) -> Self {
        self.catalogue
            .lock()
            .unwrap()
            .products
            .entry((service.into(), region.into()))
            .or_default()
            .push(vm);
        self
    }

    pub fn baseline_price(self, region: &str, instance_type: &str, price: Price) -> Self {
        self.catalogue
            .lock()
            .unwrap()
            .baseline
            .entry(region.into())
            .or_default()
            .insert(instance_type.into(), price);
        self
    }

    pub fn current_price(self, region: &str, instance_type: &str, price: Price) -> Self {
        self.catalogue
            .lock()
            .unwrap()
            .current_prices
            .entry(region.into())
            .or_default()
            .insert(instance_type.into(), price);
        self
    }

    pub fn image(self, region: &str, image: Image) -> Self {
        self.catalogue
            .lock()
            .unwrap()
            .images
            .entry(region.into())
            .or_default()
            .push(image);
        self
    }

    pub fn versions(self, region: &str, versions: &[&str]) -> Self {
        self.catalogue.lock().unwrap().versions.insert(
            region.into(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// Replace the baseline price of an instance type between cycles.
    pub fn set_baseline_price(&self, region: &str, instance_type: &str, price: Price) {
        self.catalogue
            .lock()
            .unwrap()
            .baseline
            .entry(region.into())
            .or_default()
            .insert(instance_type.into(), price);
    }

    /// Replace the products of a service region between cycles.
    pub fn set_products(&self, service: &str, region: &str, vms: Vec<VmInfo>) {
        self.catalogue
            .lock()
            .unwrap()
            .products
            .insert((service.into(), region.into()), vms);
    }

    pub fn fail(&self, failure: Failure) {
        self.failures.lock().unwrap().insert(failure);
    }

    pub fn recover(&self, failure: &Failure) {
        self.failures.lock().unwrap().remove(failure);
    }

    /// Every call made so far, e.g. `"get_zones:eu-west-1"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose record starts with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String, failure: Failure) -> Result<()> {
        self.calls.lock().unwrap().push(call.clone());
        if self.failures.lock().unwrap().contains(&failure) {
            return Err(CloudInfoError::Provider(format!("{call} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl CloudInfoer for MockInfoer {
    async fn initialize(&self) -> Result<PriceBaseline> {
        self.record("initialize".into(), Failure::Initialize)?;
        Ok(self.catalogue.lock().unwrap().baseline.clone())
    }

    async fn get_products(
        &self,
        _cached: &[VmInfo],
        service: &str,
        region: &str,
    ) -> Result<Vec<VmInfo>> {
        self.record(
            format!("get_products:{service}:{region}"),
            Failure::Products(region.into()),
        )?;
        Ok(self
            .catalogue
            .lock()
            .unwrap()
            .products
            .get(&(service.to_string(), region.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_regions(&self, service: &str) -> Result<RegionMap> {
        self.record(
            format!("get_regions:{service}"),
            Failure::Regions(service.into()),
        )?;
        let catalogue = self.catalogue.lock().unwrap();
        Ok(catalogue
            .regions
            .iter()
            .filter(|(id, _)| {
                catalogue
                    .products
                    .keys()
                    .any(|(s, r)| s == service && r == *id)
            })
            .map(|(id, name)| (id.clone(), name.clone()))
            .collect())
    }

    async fn get_zones(&self, region: &str) -> Result<Vec<String>> {
        self.record(format!("get_zones:{region}"), Failure::Zones(region.into()))?;
        Ok(self
            .catalogue
            .lock()
            .unwrap()
            .zones
            .get(region)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_current_prices(&self, region: &str) -> Result<HashMap<String, Price>> {
        self.record(
            format!("get_current_prices:{region}"),
            Failure::CurrentPrices(region.into()),
        )?;
        Ok(self
            .catalogue
            .lock()
            .unwrap()
            .current_prices
            .get(region)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_service_images(&self, service: &str, region: &str) -> Result<Vec<Image>> {
        self.record(
            format!("get_service_images:{service}:{region}"),
            Failure::Images(region.into()),
        )?;
        Ok(self
            .catalogue
            .lock()
            .unwrap()
            .images
            .get(region)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_versions(&self, service: &str, region: &str) -> Result<Vec<LocationVersion>> {
        self.record(
            format!("get_versions:{service}:{region}"),
            Failure::Versions(region.into()),
        )?;
        Ok(self
            .catalogue
            .lock()
            .unwrap()
            .versions
            .get(region)
            .map(|v| vec![LocationVersion::new(region, v.clone(), "")])
            .unwrap_or_default())
    }

    fn has_short_lived_price_info(&self) -> bool {
        self.short_lived
    }

    fn has_images(&self) -> bool {
        self.images
    }
}

/// Two compute regions with a mix of priced, baseline-priced and unpriced
/// instance types.
pub fn amazon() -> MockInfoer {
    MockInfoer::new()
        .region("eu-west-1", "EU (Ireland)", &["eu-west-1a", "eu-west-1b"])
        .region("us-east-1", "US East (N. Virginia)", &["us-east-1a", "us-east-1b"])
        .baseline_price("eu-west-1", "r5.large", Price::on_demand(0.141))
        .product("compute", "eu-west-1", VmInfo::new("m5.large", 2.0, 8.0).with_price(0.107))
        .product("compute", "eu-west-1", VmInfo::new("c5.large", 2.0, 4.0).with_price(0.096))
        .product("compute", "eu-west-1", VmInfo::new("r5.large", 2.0, 16.0))
        .product("compute", "eu-west-1", VmInfo::new("x1.16xlarge", 64.0, 976.0))
        .product("compute", "us-east-1", VmInfo::new("m5.large", 2.0, 8.0).with_price(0.096))
        .versions("eu-west-1", &["1.31", "1.30"])
}

// ============================================================================
// Recording sinks
// ============================================================================

/// One call made to a [`MetricsReporter`].
#[derive(Debug, Clone, PartialEq)]
pub enum MetricEvent {
    ProviderCompleted(String),
    RegionCompleted(String, String, String),
    Failure(String, String, String),
    ProviderShortLivedCompleted(String),
    RegionShortLivedCompleted(String, String),
    ShortLivedFailure(String, String),
    OnDemandPrice(String, String, String, f64),
}

#[derive(Default)]
pub struct RecordingMetrics {
    events: Mutex<Vec<MetricEvent>>,
}

impl RecordingMetrics {
    pub fn events(&self) -> Vec<MetricEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<(String, String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                MetricEvent::Failure(p, s, r) => Some((p, s, r)),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, event: &MetricEvent) -> bool {
        self.events.lock().unwrap().contains(event)
    }

    fn push(&self, event: MetricEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl MetricsReporter for RecordingMetrics {
    fn report_scrape_provider_completed(&self, provider: &str, _started: Instant) {
        self.push(MetricEvent::ProviderCompleted(provider.into()));
    }

    fn report_scrape_region_completed(
        &self,
        provider: &str,
        service: &str,
        region: &str,
        _started: Instant,
    ) {
        self.push(MetricEvent::RegionCompleted(
            provider.into(),
            service.into(),
            region.into(),
        ));
    }

    fn report_scrape_failure(&self, provider: &str, service: &str, region: &str) {
        self.push(MetricEvent::Failure(
            provider.into(),
            service.into(),
            region.into(),
        ));
    }

    fn report_scrape_provider_short_lived_completed(&self, provider: &str, _started: Instant) {
        self.push(MetricEvent::ProviderShortLivedCompleted(provider.into()));
    }

    fn report_scrape_region_short_lived_completed(
        &self,
        provider: &str,
        region: &str,
        _started: Instant,
    ) {
        self.push(MetricEvent::RegionShortLivedCompleted(
            provider.into(),
            region.into(),
        ));
    }

    fn report_scrape_short_lived_failure(&self, provider: &str, region: &str) {
        self.push(MetricEvent::ShortLivedFailure(provider.into(), region.into()));
    }

    fn report_on_demand_price(&self, provider: &str, region: &str, instance_type: &str, price: f64) {
        self.push(MetricEvent::OnDemandPrice(
            provider.into(),
            region.into(),
            instance_type.into(),
            price,
        ));
    }
}

#[derive(Default)]
pub struct RecordingErrorHandler {
    errors: Mutex<Vec<String>>,
}

impl RecordingErrorHandler {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }
}

impl ErrorHandler for RecordingErrorHandler {
    fn handle(&self, err: &CloudInfoError) {
        self.errors.lock().unwrap().push(err.to_string());
    }
}

#[derive(Default)]
pub struct CollectingEventBus {
    published: Mutex<Vec<String>>,
}

impl CollectingEventBus {
    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

impl EventBus for CollectingEventBus {
    fn publish_scraping_complete(&self, provider: &str) {
        self.published.lock().unwrap().push(provider.into());
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A store plus recording sinks, wired into managers and facades.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub metrics: Arc<RecordingMetrics>,
    pub events: Arc<CollectingEventBus>,
    pub errors: Arc<RecordingErrorHandler>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::default()),
            metrics: Arc::new(RecordingMetrics::default()),
            events: Arc::new(CollectingEventBus::default()),
            errors: Arc::new(RecordingErrorHandler::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            store: self.store.clone(),
            metrics: self.metrics.clone(),
            events: self.events.clone(),
            error_handler: self.errors.clone(),
        }
    }

    /// A manager for `provider` with `services` registered in the store.
    pub fn manager(
        &self,
        provider: &str,
        services: Vec<Service>,
        infoer: Arc<MockInfoer>,
    ) -> Arc<ScrapingManager> {
        self.store.store_services(provider, services);
        Arc::new(ScrapingManager::new(provider, infoer, self.collaborators()))
    }

    pub fn info(&self, providers: &[&str]) -> CloudInfo {
        CloudInfo::new(providers.iter().copied(), self.store.clone())
    }
}

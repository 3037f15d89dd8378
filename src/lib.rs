//! cloudinfo - cached cloud product information
//!
//! This crate keeps a catalogue of cloud providers' instance types, on-demand
//! and spot prices, regions, zones, images and service versions in a
//! time-bounded cache, refreshed periodically from pluggable provider data
//! sources, and answers filtered instance-type queries from that cache.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cloudinfo::{
//!     CloudInfo, CloudInfoStore, InMemoryStore, InstanceTypeFilter, InstanceTypeQuery,
//!     FloatFilter, Provider, ScrapingDriver, Service, SnapshotInfoer, StoreConfig,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> cloudinfo::Result<()> {
//!     let store: Arc<dyn CloudInfoStore> = Arc::new(InMemoryStore::new(&StoreConfig::new()));
//!
//!     let driver = ScrapingDriver::builder()
//!         .store(Arc::clone(&store))
//!         .provider(
//!             Provider::new("amazon").with_service(Service::new("compute")),
//!             Arc::new(SnapshotInfoer::new("/var/lib/cloudinfo/amazon.json")),
//!         )
//!         .build()?;
//!     let _handles = driver.start(CancellationToken::new())?;
//!
//!     let info = CloudInfo::new(["amazon"], store);
//!     let query = InstanceTypeQuery::new("eu-west-1").filter(
//!         InstanceTypeFilter::new()
//!             .cpu(FloatFilter::default().equal_to(2.0))
//!             .memory(FloatFilter::default().equal_to(8.0)),
//!     );
//!     for row in info.query_instance_types("amazon", "compute", &query)? {
//!         println!("{} {} {}", row.name, row.zone, row.price);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod events;
pub mod executor;
pub mod info;
pub mod loader;
pub mod providers;
pub mod query;
pub mod scrape;
pub mod store;
pub mod telemetry;
pub mod types;

#[cfg(feature = "server")]
pub mod server;

// Re-export main types at crate root
pub use error::{CloudInfoError, ErrorHandler, LogErrorHandler, Result};
pub use events::{BroadcastEventBus, EventBus, EventStream, NoopEventBus, ScrapingComplete};
pub use executor::PeriodicExecutor;
pub use info::CloudInfo;
pub use loader::{LoadSummary, ServiceData, StaticDataLoader, StaticSource};
pub use providers::{CloudInfoer, ProviderSnapshot, SnapshotInfoer};
pub use query::{
    CategoryFilter, EnumFilter, FloatFilter, InstanceType, InstanceTypeFilter,
    InstanceTypeQuery, NetworkCategoryFilter,
};
pub use scrape::{ScrapeConfig, ScrapingDriver, ScrapingDriverBuilder, ScrapingManager};
pub use store::{CloudInfoStore, InMemoryStore, StoreConfig};
pub use telemetry::{MetricsReporter, NoopMetricsReporter, RecorderMetricsReporter};

// Re-export all types
pub use types::{
    COMPUTE_SERVICE, Continent, Image, InstanceCategory, LocationVersion, NetworkCategory, Price,
    PriceBaseline, ProductDetails, Provider, Region, RegionMap, Service, SpotPriceInfo, VmInfo,
    ZonePrice,
};

//! Scraping: keeping the store populated from provider data sources.
//!
//! - [`ScrapingManager`] runs one provider's refresh cycle: price baseline,
//!   then regions → zones → products → images → versions for every dynamic
//!   service, then status and a completion event.
//! - [`ScrapingDriver`] owns one manager per provider and runs two
//!   [`PeriodicExecutor`](crate::PeriodicExecutor) loops: the slow full
//!   refresh and the fast short-lived (spot) price refresh.
//!
//! Failures never escape a cycle. They are reported to the metrics sink and
//! the [`ErrorHandler`] and abort the smallest affected unit only.

mod builder;
mod driver;
mod manager;

pub use builder::ScrapingDriverBuilder;
pub use driver::ScrapingDriver;
pub use manager::{ScrapingManager, merge_prices};

use std::sync::Arc;
use std::time::Duration;

use crate::error::{CloudInfoError, ErrorHandler, Result};
use crate::events::EventBus;
use crate::store::CloudInfoStore;
use crate::telemetry::MetricsReporter;

/// Scheduling configuration for the scrape loops.
///
/// ```rust
/// # use cloudinfo::ScrapeConfig;
/// # use std::time::Duration;
/// let config = ScrapeConfig::new()
///     .renewal_interval(Duration::from_secs(6 * 3600))
///     .short_lived_interval(Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Interval of the full refresh loop. Default: 24 hours.
    pub renewal_interval: Duration,
    /// Interval of the short-lived price loop. Default: 4 minutes.
    pub short_lived_interval: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            renewal_interval: Duration::from_secs(24 * 3600),
            short_lived_interval: Duration::from_secs(4 * 60),
        }
    }
}

impl ScrapeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the full refresh interval.
    pub fn renewal_interval(mut self, interval: Duration) -> Self {
        self.renewal_interval = interval;
        self
    }

    /// Set the short-lived price refresh interval.
    pub fn short_lived_interval(mut self, interval: Duration) -> Self {
        self.short_lived_interval = interval;
        self
    }

    /// Reject zero intervals.
    pub fn validate(&self) -> Result<()> {
        if self.renewal_interval.is_zero() {
            return Err(CloudInfoError::Configuration(
                "renewal interval must be non-zero".into(),
            ));
        }
        if self.short_lived_interval.is_zero() {
            return Err(CloudInfoError::Configuration(
                "short-lived price interval must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Shared sinks every [`ScrapingManager`] writes to.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn CloudInfoStore>,
    pub metrics: Arc<dyn MetricsReporter>,
    pub events: Arc<dyn EventBus>,
    pub error_handler: Arc<dyn ErrorHandler>,
}

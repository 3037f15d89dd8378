//! Builder for [`ScrapingDriver`].

use std::sync::Arc;
use std::time::Duration;

use super::{Collaborators, ScrapeConfig, ScrapingDriver, ScrapingManager};
use crate::error::{CloudInfoError, ErrorHandler, LogErrorHandler, Result};
use crate::events::{EventBus, NoopEventBus};
use crate::providers::CloudInfoer;
use crate::store::CloudInfoStore;
use crate::telemetry::{MetricsReporter, RecorderMetricsReporter};
use crate::types::Provider;

/// Builder for configuring a [`ScrapingDriver`].
///
/// Providers are injected explicitly, one [`CloudInfoer`] per provider name.
/// A store is required; every other collaborator has a default:
///
/// | Collaborator | Default |
/// |---|---|
/// | metrics | [`RecorderMetricsReporter`] |
/// | event bus | [`NoopEventBus`] |
/// | error handler | [`LogErrorHandler`] |
///
/// ```rust,ignore
/// let driver = ScrapingDriver::builder()
///     .provider(Provider::new("amazon").with_service(Service::new("compute")), amazon)
///     .store(store.clone())
///     .renewal_interval(Duration::from_secs(6 * 3600))
///     .build()?;
/// ```
pub struct ScrapingDriverBuilder {
    providers: Vec<(Provider, Arc<dyn CloudInfoer>)>,
    store: Option<Arc<dyn CloudInfoStore>>,
    metrics: Option<Arc<dyn MetricsReporter>>,
    event_bus: Option<Arc<dyn EventBus>>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    config: ScrapeConfig,
}

impl ScrapingDriverBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            store: None,
            metrics: None,
            event_bus: None,
            error_handler: None,
            config: ScrapeConfig::default(),
        }
    }

    /// Register a provider, its services and its data source.
    pub fn provider(mut self, provider: Provider, infoer: Arc<dyn CloudInfoer>) -> Self {
        self.providers.push((provider, infoer));
        self
    }

    /// Set the store scraped data is written to.
    pub fn store(mut self, store: Arc<dyn CloudInfoStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the metrics sink.
    pub fn metrics(mut self, metrics: Arc<dyn MetricsReporter>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set the event bus completion events are published to.
    pub fn event_bus(mut self, event_bus: Arc<dyn EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Set the handler for errors that end a scrape step.
    pub fn error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = Some(error_handler);
        self
    }

    /// Replace the whole scheduling configuration.
    pub fn config(mut self, config: ScrapeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the full refresh interval.
    pub fn renewal_interval(mut self, interval: Duration) -> Self {
        self.config.renewal_interval = interval;
        self
    }

    /// Set the short-lived price refresh interval.
    pub fn short_lived_interval(mut self, interval: Duration) -> Self {
        self.config.short_lived_interval = interval;
        self
    }

    /// Build the driver.
    ///
    /// Seeds each provider's services into the store.
    pub fn build(self) -> Result<ScrapingDriver> {
        let store = self
            .store
            .ok_or_else(|| CloudInfoError::Configuration("a store is required".into()))?;
        if self.providers.is_empty() {
            return Err(CloudInfoError::Configuration(
                "at least one provider is required".into(),
            ));
        }
        self.config.validate()?;

        let collaborators = Collaborators {
            store: Arc::clone(&store),
            metrics: self
                .metrics
                .unwrap_or_else(|| Arc::new(RecorderMetricsReporter)),
            events: self.event_bus.unwrap_or_else(|| Arc::new(NoopEventBus)),
            error_handler: self
                .error_handler
                .unwrap_or_else(|| Arc::new(LogErrorHandler)),
        };

        let mut providers = self.providers;
        providers.sort_by(|(a, _), (b, _)| a.provider.cmp(&b.provider));
        if let Some(pair) = providers
            .windows(2)
            .find(|pair| pair[0].0.provider == pair[1].0.provider)
        {
            return Err(CloudInfoError::Configuration(format!(
                "provider {} registered twice",
                pair[0].0.provider
            )));
        }

        let mut managers = Vec::with_capacity(providers.len());
        let mut descriptors = Vec::with_capacity(providers.len());
        for (provider, infoer) in providers {
            store.store_services(&provider.provider, provider.services.clone());
            managers.push(Arc::new(ScrapingManager::new(
                provider.provider.clone(),
                infoer,
                collaborators.clone(),
            )));
            descriptors.push(provider);
        }

        Ok(ScrapingDriver::new(managers, descriptors, self.config))
    }
}

impl Default for ScrapingDriverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

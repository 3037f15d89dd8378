//! Scheduling of all provider refreshes.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{ScrapeConfig, ScrapingDriverBuilder, ScrapingManager};
use crate::error::{CloudInfoError, Result};
use crate::executor::PeriodicExecutor;
use crate::types::Provider;

/// Owns one [`ScrapingManager`] per provider and drives both refresh loops.
///
/// Created through [`ScrapingDriver::builder`].
#[derive(Debug)]
pub struct ScrapingDriver {
    managers: Arc<Vec<Arc<ScrapingManager>>>,
    providers: Vec<Provider>,
    config: ScrapeConfig,
}

impl ScrapingDriver {
    pub fn builder() -> ScrapingDriverBuilder {
        ScrapingDriverBuilder::new()
    }

    pub(super) fn new(
        managers: Vec<Arc<ScrapingManager>>,
        providers: Vec<Provider>,
        config: ScrapeConfig,
    ) -> Self {
        Self {
            managers: Arc::new(managers),
            providers,
            config,
        }
    }

    /// Providers managed by this driver, with their services.
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Manager of one provider.
    pub fn manager(&self, provider: &str) -> Option<&Arc<ScrapingManager>> {
        self.managers.iter().find(|m| m.provider() == provider)
    }

    /// Start the full refresh and the short-lived price loops.
    ///
    /// Both run immediately and then on their intervals until `cancel`
    /// fires. Returns the handles of the two scheduling loops.
    ///
    /// Both intervals are checked before anything is spawned, so an error
    /// leaves no loop running.
    pub fn start(&self, cancel: CancellationToken) -> Result<Vec<JoinHandle<()>>> {
        self.config.validate()?;
        info!(
            providers = self.managers.len(),
            renewal_interval = ?self.config.renewal_interval,
            short_lived_interval = ?self.config.short_lived_interval,
            "starting scraping"
        );

        let managers = Arc::clone(&self.managers);
        let full = PeriodicExecutor::new(self.config.renewal_interval).execute(
            cancel.clone(),
            move |_| {
                renew_all(&managers);
                async {}
            },
        )?;

        let managers = Arc::clone(&self.managers);
        let short_lived = PeriodicExecutor::new(self.config.short_lived_interval).execute(
            cancel,
            move |_| {
                renew_short_lived(&managers);
                async {}
            },
        )?;

        Ok(vec![full, short_lived])
    }

    /// Launch a full cycle for every provider without waiting for them.
    pub fn renew_all(&self) {
        renew_all(&self.managers);
    }

    /// Launch a short-lived price refresh for every provider that has
    /// short-lived prices, without waiting for them.
    pub fn renew_short_lived(&self) {
        renew_short_lived(&self.managers);
    }

    /// Run a full cycle for one provider and wait for it to finish.
    pub async fn refresh_provider(&self, provider: &str) -> Result<()> {
        let manager = self
            .manager(provider)
            .ok_or_else(|| CloudInfoError::UnsupportedProvider(provider.to_string()))?;
        manager.scrape().await;
        Ok(())
    }
}

fn renew_all(managers: &[Arc<ScrapingManager>]) {
    for manager in managers {
        let manager = Arc::clone(manager);
        tokio::spawn(async move { manager.scrape().await });
    }
}

fn renew_short_lived(managers: &[Arc<ScrapingManager>]) {
    for manager in managers {
        if !manager.has_short_lived_price_info() {
            debug!(
                provider = manager.provider(),
                "skip scraping short-lived prices, not applicable for provider"
            );
            continue;
        }
        tokio::spawn(Arc::clone(manager).scrape_prices_in_all_regions());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn start_rejects_invalid_interval_before_spawning() {
        let config = ScrapeConfig {
            renewal_interval: Duration::from_secs(3600),
            short_lived_interval: Duration::ZERO,
        };
        let driver = ScrapingDriver::new(Vec::new(), Vec::new(), config);
        let cancel = CancellationToken::new();

        let result = driver.start(cancel.clone());

        assert!(matches!(result, Err(CloudInfoError::Configuration(_))));
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn start_returns_both_loops() {
        let driver = ScrapingDriver::new(Vec::new(), Vec::new(), ScrapeConfig::default());
        let cancel = CancellationToken::new();

        let handles = driver.start(cancel.clone()).unwrap();
        assert_eq!(handles.len(), 2);

        cancel.cancel();
        for handle in handles {
            handle.await.unwrap();
        }
    }
}

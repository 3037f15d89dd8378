//! Per-provider refresh cycle.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use super::Collaborators;
use crate::error::{CloudInfoError, ErrorHandler, Result};
use crate::events::EventBus;
use crate::providers::CloudInfoer;
use crate::store::CloudInfoStore;
use crate::telemetry::{MetricsReporter, NOT_APPLICABLE};
use crate::types::{COMPUTE_SERVICE, VmInfo};

/// Merge cached prices into freshly fetched VMs.
///
/// A cached price overrides the VM's own price when it is positive. VMs left
/// without a positive price are dropped.
pub fn merge_prices(
    store: &dyn CloudInfoStore,
    provider: &str,
    region: &str,
    vms: Vec<VmInfo>,
) -> Vec<VmInfo> {
    vms.into_iter()
        .filter_map(|mut vm| {
            if let Some(price) = store.get_price(provider, region, &vm.instance_type)
                && price.on_demand_price > 0.0
            {
                vm.on_demand_price = price.on_demand_price;
            }
            vm.is_priced().then_some(vm)
        })
        .collect()
}

/// Refreshes everything cached for one provider.
pub struct ScrapingManager {
    provider: String,
    infoer: Arc<dyn CloudInfoer>,
    store: Arc<dyn CloudInfoStore>,
    metrics: Arc<dyn MetricsReporter>,
    events: Arc<dyn EventBus>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl ScrapingManager {
    pub fn new(
        provider: impl Into<String>,
        infoer: Arc<dyn CloudInfoer>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            provider: provider.into(),
            infoer,
            store: collaborators.store,
            metrics: collaborators.metrics,
            events: collaborators.events,
            error_handler: collaborators.error_handler,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn has_short_lived_price_info(&self) -> bool {
        self.infoer.has_short_lived_price_info()
    }

    /// Run one full refresh cycle.
    ///
    /// Never fails: errors are reported and the affected unit is skipped.
    /// A failed price baseline aborts the cycle before any service is
    /// touched and without publishing a completion event.
    #[instrument(name = "scrape", skip(self), fields(provider = %self.provider))]
    pub async fn scrape(&self) {
        info!("start scraping provider information");
        let started = Instant::now();

        if let Err(e) = self.initialize().await {
            self.metrics
                .report_scrape_failure(&self.provider, NOT_APPLICABLE, NOT_APPLICABLE);
            self.error_handler.handle(&e);
            return;
        }

        self.scrape_service_information().await;

        self.events.publish_scraping_complete(&self.provider);
        self.metrics
            .report_scrape_provider_completed(&self.provider, started);
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "finished scraping provider information"
        );
    }

    /// Load the provider-wide on-demand price baseline into the store.
    async fn initialize(&self) -> Result<()> {
        info!("initializing price baseline");
        let baseline =
            self.infoer
                .initialize()
                .await
                .map_err(|e| CloudInfoError::Initialization {
                    provider: self.provider.clone(),
                    source: Box::new(e),
                })?;

        for (region, prices) in baseline {
            for (instance_type, price) in prices {
                self.metrics.report_on_demand_price(
                    &self.provider,
                    &region,
                    &instance_type,
                    price.on_demand_price,
                );
                self.store
                    .store_price(&self.provider, &region, &instance_type, price);
            }
        }
        info!("finished initializing price baseline");
        Ok(())
    }

    async fn scrape_service_information(&self) {
        let Some(services) = self.store.get_services(&self.provider) else {
            self.metrics
                .report_scrape_failure(&self.provider, NOT_APPLICABLE, NOT_APPLICABLE);
            error!("no services registered for provider");
            return;
        };

        let mut failed = false;
        for service in services {
            if service.is_static {
                info!(service = %service.service, "service is static, skip scraping");
                continue;
            }
            info!(service = %service.service, "start scraping service region information");
            if let Err(e) = self.scrape_service(&service.service).await {
                self.error_handler.handle(&e);
                failed = true;
            }
        }

        // Status marks the last fully successful cycle only.
        if failed {
            warn!("scrape cycle had failures, status not updated");
            return;
        }
        self.update_status();
    }

    /// Refresh regions and every region of one service.
    ///
    /// The first failing region aborts the rest of the service.
    async fn scrape_service(&self, service: &str) -> Result<()> {
        let regions = self.infoer.get_regions(service).await.map_err(|e| {
            self.metrics
                .report_scrape_failure(&self.provider, service, NOT_APPLICABLE);
            CloudInfoError::scrape_failed(&self.provider, service, NOT_APPLICABLE, e)
        })?;

        let region_ids: Vec<String> = regions.keys().cloned().collect();
        self.store.replace_regions(&self.provider, service, regions);

        for region in region_ids {
            let started = Instant::now();
            self.scrape_service_region(service, &region)
                .await
                .map_err(|e| {
                    self.metrics
                        .report_scrape_failure(&self.provider, service, &region);
                    CloudInfoError::scrape_failed(&self.provider, service, &region, e)
                })?;
            self.metrics
                .report_scrape_region_completed(&self.provider, service, &region, started);
        }
        Ok(())
    }

    async fn scrape_service_region(&self, service: &str, region: &str) -> Result<()> {
        debug!(service, region, "retrieving regional information");
        self.scrape_zones(service, region).await?;
        self.scrape_products(service, region).await?;
        self.scrape_images(service, region).await?;
        self.scrape_versions(service, region).await
    }

    async fn scrape_zones(&self, service: &str, region: &str) -> Result<()> {
        let zones = self.infoer.get_zones(region).await?;
        self.store
            .replace_zones(&self.provider, service, region, zones);
        Ok(())
    }

    /// Fetch products and commit them with merged prices in one replace.
    async fn scrape_products(&self, service: &str, region: &str) -> Result<()> {
        let cached = self
            .store
            .get_vms(&self.provider, service, region)
            .unwrap_or_else(|| {
                debug!(service, region, "VMs not yet cached");
                Vec::new()
            });

        let products = self
            .infoer
            .get_products(&cached, service, region)
            .await?;

        for vm in products.iter().filter(|vm| vm.is_priced()) {
            self.metrics.report_on_demand_price(
                &self.provider,
                region,
                &vm.instance_type,
                vm.on_demand_price,
            );
        }

        let fetched = products.len();
        let merged = merge_prices(self.store.as_ref(), &self.provider, region, products);
        if merged.len() < fetched {
            debug!(
                service,
                region,
                dropped = fetched - merged.len(),
                "dropped unpriced VMs"
            );
        }
        self.store
            .replace_vms(&self.provider, service, region, merged);
        Ok(())
    }

    async fn scrape_images(&self, service: &str, region: &str) -> Result<()> {
        if !self.infoer.has_images() {
            return Ok(());
        }
        let images = self.infoer.get_service_images(service, region).await?;
        self.store
            .replace_images(&self.provider, service, region, images);
        Ok(())
    }

    async fn scrape_versions(&self, service: &str, region: &str) -> Result<()> {
        let versions = self.infoer.get_versions(service, region).await?;
        self.store
            .replace_versions(&self.provider, service, region, versions);
        Ok(())
    }

    fn update_status(&self) {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        info!(status = %millis, "updating provider status");
        self.store
            .store_status(&self.provider, millis.to_string());
    }

    /// Refresh the short-lived prices of one region.
    ///
    /// Only price entries returned by the provider are overwritten. Failures
    /// are reported to the metrics sink and the error handler before being
    /// returned.
    pub async fn scrape_prices_in_region(&self, region: &str) -> Result<()> {
        let started = Instant::now();
        match self.infoer.get_current_prices(region).await {
            Ok(prices) => {
                for (instance_type, price) in prices {
                    self.store
                        .store_price(&self.provider, region, &instance_type, price);
                }
                self.metrics.report_scrape_region_short_lived_completed(
                    &self.provider,
                    region,
                    started,
                );
                Ok(())
            }
            Err(e) => {
                self.metrics
                    .report_scrape_short_lived_failure(&self.provider, region);
                let err = CloudInfoError::scrape_failed(&self.provider, COMPUTE_SERVICE, region, e);
                self.error_handler.handle(&err);
                Err(err)
            }
        }
    }

    /// Refresh short-lived prices in every compute region concurrently.
    ///
    /// Waits for all region tasks before reporting provider completion. A
    /// failed region does not cancel its siblings.
    #[instrument(name = "scrape_prices", skip(self), fields(provider = %self.provider))]
    pub async fn scrape_prices_in_all_regions(self: Arc<Self>) {
        info!("start scraping short-lived prices");
        let started = Instant::now();

        let regions = match self.infoer.get_regions(COMPUTE_SERVICE).await {
            Ok(regions) => regions,
            Err(e) => {
                self.error_handler.handle(&CloudInfoError::scrape_failed(
                    &self.provider,
                    COMPUTE_SERVICE,
                    NOT_APPLICABLE,
                    e,
                ));
                return;
            }
        };

        let mut tasks = JoinSet::new();
        for region in regions.into_keys() {
            let manager = Arc::clone(&self);
            tasks.spawn(async move {
                // Already reported inside.
                let _ = manager.scrape_prices_in_region(&region).await;
            });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "short-lived price task did not complete");
            }
        }

        self.metrics
            .report_scrape_provider_short_lived_completed(&self.provider, started);
    }
}

impl std::fmt::Debug for ScrapingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapingManager")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

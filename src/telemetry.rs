//! Telemetry metric name constants and the scrape metrics reporter.
//!
//! Centralised metric names for cloudinfo scraping. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `cloudinfo_`. Counters end in `_total`,
//! durations are gauges in `_seconds` holding the last observed value.
//!
//! # Common labels
//!
//! - `provider`: provider name (e.g. "amazon", "google")
//! - `service`: service name (e.g. "compute", "pke"), or `"N/A"`
//! - `region`: region id (e.g. "eu-west-1"), or `"N/A"`
//! - `instance_type`: instance type name

use std::time::Instant;

/// Duration of the last full scrape cycle.
///
/// Labels: `provider`.
pub const SCRAPE_COMPLETE_DURATION_SECONDS: &str = "cloudinfo_scrape_complete_duration_seconds";

/// Duration of the last scrape of one service region.
///
/// Labels: `provider`, `service`, `region`.
pub const SCRAPE_REGION_DURATION_SECONDS: &str = "cloudinfo_scrape_region_duration_seconds";

/// Total scrape failures.
///
/// Labels: `provider`, `service`, `region`.
pub const SCRAPE_FAILURES_TOTAL: &str = "cloudinfo_scrape_failures_total";

/// Duration of the last short-lived (spot) price refresh for a provider.
///
/// Labels: `provider`.
pub const SCRAPE_SHORT_LIVED_COMPLETE_DURATION_SECONDS: &str =
    "cloudinfo_scrape_short_lived_complete_duration_seconds";

/// Duration of the last short-lived price refresh of one region.
///
/// Labels: `provider`, `region`.
pub const SCRAPE_SHORT_LIVED_REGION_DURATION_SECONDS: &str =
    "cloudinfo_scrape_short_lived_region_duration_seconds";

/// Total short-lived price refresh failures.
///
/// Labels: `provider`, `region`.
pub const SCRAPE_SHORT_LIVED_FAILURES_TOTAL: &str = "cloudinfo_scrape_short_lived_failures_total";

/// Current on-demand price per instance type.
///
/// Labels: `provider`, `region`, `instance_type`.
pub const ON_DEMAND_PRICE: &str = "cloudinfo_on_demand_price";

/// Label value used when the service or region is not known.
pub const NOT_APPLICABLE: &str = "N/A";

/// Scrape metrics sink.
///
/// Implementations must be cheap and infallible; the scraper calls them
/// inline on every step.
pub trait MetricsReporter: Send + Sync {
    /// A full scrape cycle for `provider` finished.
    fn report_scrape_provider_completed(&self, provider: &str, started: Instant);

    /// One service region was scraped successfully.
    fn report_scrape_region_completed(
        &self,
        provider: &str,
        service: &str,
        region: &str,
        started: Instant,
    );

    /// A scrape step failed.
    fn report_scrape_failure(&self, provider: &str, service: &str, region: &str);

    /// A short-lived price refresh over all regions of `provider` finished.
    fn report_scrape_provider_short_lived_completed(&self, provider: &str, started: Instant);

    /// A short-lived price refresh of one region finished.
    fn report_scrape_region_short_lived_completed(
        &self,
        provider: &str,
        region: &str,
        started: Instant,
    );

    /// A short-lived price refresh of one region failed.
    fn report_scrape_short_lived_failure(&self, provider: &str, region: &str);

    /// Observed on-demand price of an instance type.
    fn report_on_demand_price(&self, provider: &str, region: &str, instance_type: &str, price: f64);
}

/// Reporter that emits through the global (or thread-local) `metrics` recorder.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecorderMetricsReporter;

impl MetricsReporter for RecorderMetricsReporter {
    fn report_scrape_provider_completed(&self, provider: &str, started: Instant) {
        metrics::gauge!(SCRAPE_COMPLETE_DURATION_SECONDS, "provider" => provider.to_string())
            .set(started.elapsed().as_secs_f64());
    }

    fn report_scrape_region_completed(
        &self,
        provider: &str,
        service: &str,
        region: &str,
        started: Instant,
    ) {
        metrics::gauge!(
            SCRAPE_REGION_DURATION_SECONDS,
            "provider" => provider.to_string(),
            "service" => service.to_string(),
            "region" => region.to_string()
        )
        .set(started.elapsed().as_secs_f64());
    }

    fn report_scrape_failure(&self, provider: &str, service: &str, region: &str) {
        metrics::counter!(
            SCRAPE_FAILURES_TOTAL,
            "provider" => provider.to_string(),
            "service" => service.to_string(),
            "region" => region.to_string()
        )
        .increment(1);
    }

    fn report_scrape_provider_short_lived_completed(&self, provider: &str, started: Instant) {
        metrics::gauge!(
            SCRAPE_SHORT_LIVED_COMPLETE_DURATION_SECONDS,
            "provider" => provider.to_string()
        )
        .set(started.elapsed().as_secs_f64());
    }

    fn report_scrape_region_short_lived_completed(
        &self,
        provider: &str,
        region: &str,
        started: Instant,
    ) {
        metrics::gauge!(
            SCRAPE_SHORT_LIVED_REGION_DURATION_SECONDS,
            "provider" => provider.to_string(),
            "region" => region.to_string()
        )
        .set(started.elapsed().as_secs_f64());
    }

    fn report_scrape_short_lived_failure(&self, provider: &str, region: &str) {
        metrics::counter!(
            SCRAPE_SHORT_LIVED_FAILURES_TOTAL,
            "provider" => provider.to_string(),
            "region" => region.to_string()
        )
        .increment(1);
    }

    fn report_on_demand_price(&self, provider: &str, region: &str, instance_type: &str, price: f64) {
        metrics::gauge!(
            ON_DEMAND_PRICE,
            "provider" => provider.to_string(),
            "region" => region.to_string(),
            "instance_type" => instance_type.to_string()
        )
        .set(price);
    }
}

/// Reporter that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsReporter;

impl MetricsReporter for NoopMetricsReporter {
    fn report_scrape_provider_completed(&self, _provider: &str, _started: Instant) {}

    fn report_scrape_region_completed(
        &self,
        _provider: &str,
        _service: &str,
        _region: &str,
        _started: Instant,
    ) {
    }

    fn report_scrape_failure(&self, _provider: &str, _service: &str, _region: &str) {}

    fn report_scrape_provider_short_lived_completed(&self, _provider: &str, _started: Instant) {}

    fn report_scrape_region_short_lived_completed(
        &self,
        _provider: &str,
        _region: &str,
        _started: Instant,
    ) {
    }

    fn report_scrape_short_lived_failure(&self, _provider: &str, _region: &str) {}

    fn report_on_demand_price(
        &self,
        _provider: &str,
        _region: &str,
        _instance_type: &str,
        _price: f64,
    ) {
    }
}

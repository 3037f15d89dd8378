//! Provider and service descriptors.
//!
//! Both come from configuration at process start and do not change for the
//! lifetime of the process.

use serde::{Deserialize, Serialize};

/// Name of the service whose regions drive the short-lived price refresh.
pub const COMPUTE_SERVICE: &str = "compute";

/// A product line offered by a provider (e.g. "compute", "pke", "eks").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Service identifier.
    pub service: String,
    /// Static services have a fixed region/product set; region scraping is
    /// skipped for them and their data comes from a data file instead.
    #[serde(default)]
    pub is_static: bool,
}

impl Service {
    /// A dynamic (scraped) service.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            service: name.into(),
            is_static: false,
        }
    }

    /// A static (file-loaded) service.
    pub fn new_static(name: impl Into<String>) -> Self {
        Self {
            service: name.into(),
            is_static: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.service
    }
}

/// A cloud provider together with the services it offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Provider identifier (e.g. "amazon").
    pub provider: String,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Provider {
    /// Create a provider with no services.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            provider: name.into(),
            services: Vec::new(),
        }
    }

    /// Add a service to this provider.
    pub fn with_service(mut self, service: Service) -> Self {
        if !self.services.iter().any(|s| s.service == service.service) {
            self.services.push(service);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.provider
    }
}

//! Configuration loading for cloudinfod.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.cloudinfo/config.toml` (user)
//! 3. `/etc/cloudinfo/config.toml` (system)
//!
//! ```toml
//! [scrape]
//! renewal_interval_secs = 86400
//! short_lived_interval_secs = 240
//!
//! [store]
//! max_entries = 500000
//! ttl_secs = 172800
//!
//! [providers.amazon]
//! snapshot = "/var/lib/cloudinfo/amazon.json"
//!
//! [[providers.amazon.services]]
//! name = "compute"
//!
//! [[providers.amazon.services]]
//! name = "eks"
//! static = true
//! data_file = "/var/lib/cloudinfo/amazon-eks.json"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::scrape::ScrapeConfig;
use crate::store::StoreConfig;
use crate::types::{Provider, Service};
use crate::{CloudInfoError, Result};

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scrape: ScrapeSection,
    #[serde(default)]
    pub store: StoreSection,
    /// Provider name → provider configuration.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

/// Scrape scheduling.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeSection {
    /// Full refresh interval in seconds (default: 86400).
    #[serde(default = "default_renewal_interval")]
    pub renewal_interval_secs: u64,
    /// Short-lived price refresh interval in seconds (default: 240).
    #[serde(default = "default_short_lived_interval")]
    pub short_lived_interval_secs: u64,
}

impl Default for ScrapeSection {
    fn default() -> Self {
        Self {
            renewal_interval_secs: default_renewal_interval(),
            short_lived_interval_secs: default_short_lived_interval(),
        }
    }
}

fn default_renewal_interval() -> u64 {
    24 * 3600
}

fn default_short_lived_interval() -> u64 {
    4 * 60
}

/// Store sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    /// Maximum cached entries (default: 500000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    /// Entry time-to-live in seconds (default: 172800).
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_secs: default_ttl(),
        }
    }
}

fn default_max_entries() -> u64 {
    500_000
}

fn default_ttl() -> u64 {
    48 * 3600
}

/// One provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    /// Catalogue snapshot served by the provider's data source.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

/// One service of a provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    /// Static services are loaded from `data_file` instead of scraped.
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

impl ProviderConfig {
    /// Provider descriptor with the configured services.
    pub fn descriptor(&self, name: &str) -> Provider {
        self.services
            .iter()
            .fold(Provider::new(name), |provider, service| {
                provider.with_service(Service {
                    service: service.name.clone(),
                    is_static: service.is_static,
                })
            })
    }

    /// Static services with their data files.
    pub fn static_services(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.services.iter().filter_map(|s| match (&s.data_file, s.is_static) {
            (Some(path), true) => Some((s.name.as_str(), path.as_path())),
            _ => None,
        })
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.cloudinfo/config.toml`
    /// 3. `/etc/cloudinfo/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            CloudInfoError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CloudInfoError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(CloudInfoError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".cloudinfo").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/cloudinfo/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(CloudInfoError::Configuration(
            "No config file found. Create ~/.cloudinfo/config.toml or /etc/cloudinfo/config.toml"
                .to_string(),
        ))
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.scrape_config().validate()?;
        if self.store.ttl_secs == 0 {
            return Err(CloudInfoError::Configuration(
                "store ttl must be non-zero".into(),
            ));
        }
        if self.store.ttl_secs <= self.scrape.renewal_interval_secs {
            return Err(CloudInfoError::Configuration(format!(
                "store ttl ({}s) must exceed the renewal interval ({}s)",
                self.store.ttl_secs, self.scrape.renewal_interval_secs
            )));
        }
        for (name, provider) in &self.providers {
            if provider.services.is_empty() {
                return Err(CloudInfoError::Configuration(format!(
                    "provider {name} has no services"
                )));
            }
            if let Some(service) = provider
                .services
                .iter()
                .find(|s| s.is_static && s.data_file.is_none())
            {
                return Err(CloudInfoError::Configuration(format!(
                    "static service {name}/{} needs a data_file",
                    service.name
                )));
            }
            if provider.snapshot.is_none() {
                return Err(CloudInfoError::Configuration(format!(
                    "provider {name} has no snapshot"
                )));
            }
        }
        Ok(())
    }

    pub fn scrape_config(&self) -> ScrapeConfig {
        ScrapeConfig::new()
            .renewal_interval(Duration::from_secs(self.scrape.renewal_interval_secs))
            .short_lived_interval(Duration::from_secs(self.scrape.short_lived_interval_secs))
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new()
            .max_entries(self.store.max_entries)
            .ttl(Duration::from_secs(self.store.ttl_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.scrape.renewal_interval_secs, 86_400);
        assert_eq!(config.scrape.short_lived_interval_secs, 240);
        assert_eq!(config.store.max_entries, 500_000);
        assert_eq!(config.store.ttl_secs, 172_800);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [scrape]
            renewal_interval_secs = 3600
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.scrape_config().renewal_interval,
            Duration::from_secs(3600)
        );
        // Defaults preserved
        assert_eq!(config.scrape.short_lived_interval_secs, 240);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [scrape]
            renewal_interval_secs = 21600
            short_lived_interval_secs = 120

            [store]
            max_entries = 1000
            ttl_secs = 43200

            [providers.amazon]
            snapshot = "/var/lib/cloudinfo/amazon.json"

            [[providers.amazon.services]]
            name = "compute"

            [[providers.amazon.services]]
            name = "eks"
            static = true
            data_file = "/var/lib/cloudinfo/amazon-eks.json"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.store_config().max_entries, 1000);

        let amazon = &config.providers["amazon"];
        assert_eq!(
            amazon.snapshot,
            Some(PathBuf::from("/var/lib/cloudinfo/amazon.json"))
        );

        let descriptor = amazon.descriptor("amazon");
        assert_eq!(descriptor.services.len(), 2);
        assert!(!descriptor.services[0].is_static);
        assert!(descriptor.services[1].is_static);

        let statics: Vec<_> = amazon.static_services().collect();
        assert_eq!(
            statics,
            vec![("eks", Path::new("/var/lib/cloudinfo/amazon-eks.json"))]
        );
    }

    #[test]
    fn ttl_must_exceed_renewal_interval() {
        let toml = r#"
            [scrape]
            renewal_interval_secs = 86400

            [store]
            ttl_secs = 3600
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("renewal interval"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let toml = r#"
            [scrape]
            short_lived_interval_secs = 0
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(CloudInfoError::Configuration(_))
        ));
    }

    #[test]
    fn static_service_requires_data_file() {
        let toml = r#"
            [[providers.google.services]]
            name = "gke"
            static = true
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("google/gke"));
    }

    #[test]
    fn provider_requires_snapshot() {
        let toml = r#"
            [[providers.azure.services]]
            name = "compute"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("azure has no snapshot"));
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
                [providers.alibaba]
                snapshot = "alibaba.json"

                [[providers.alibaba.services]]
                name = "compute"
            "#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers["alibaba"].descriptor("alibaba").name(), "alibaba");
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }
}

//! cloudinfo error types

use tracing::error;

/// cloudinfo error types
#[derive(Debug, thiserror::Error)]
pub enum CloudInfoError {
    // Read path
    /// The store has no entry yet for the requested key. Expected before the
    /// first successful scrape; callers should retry later.
    #[error("{what} not yet cached ({scope})")]
    NotYetCached { what: &'static str, scope: String },

    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    // Provider errors
    #[error("provider API error: {0}")]
    Provider(String),

    #[error("scrape failed (provider: {provider}, service: {service}, region: {region}): {source}")]
    ScrapeFailed {
        provider: String,
        service: String,
        region: String,
        #[source]
        source: Box<CloudInfoError>,
    },

    #[error("failed to initialize price baseline for {provider}: {source}")]
    Initialization {
        provider: String,
        #[source]
        source: Box<CloudInfoError>,
    },

    #[error("operation not implemented: {0}")]
    NotImplemented(&'static str),

    // Caller errors
    /// Malformed instance-type query. Raised before the store is touched.
    #[error("{0}")]
    Validation(String),

    // Configuration / data errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CloudInfoError {
    /// Build a [`NotYetCached`](Self::NotYetCached) error for a store scope
    /// such as `"amazon/compute/eu-west-1"`.
    pub fn not_yet_cached(what: &'static str, scope: impl Into<String>) -> Self {
        Self::NotYetCached {
            what,
            scope: scope.into(),
        }
    }

    /// Wrap an error with the provider/service/region it happened in.
    pub fn scrape_failed(
        provider: impl Into<String>,
        service: impl Into<String>,
        region: impl Into<String>,
        source: CloudInfoError,
    ) -> Self {
        Self::ScrapeFailed {
            provider: provider.into(),
            service: service.into(),
            region: region.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error means "data not refreshed yet" rather than a failure.
    pub fn is_not_yet_cached(&self) -> bool {
        matches!(self, Self::NotYetCached { .. })
    }

    /// Whether this is a caller error (malformed query).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for cloudinfo operations
pub type Result<T> = std::result::Result<T, CloudInfoError>;

/// Central sink for errors that end a scrape step.
///
/// Handlers report (log, alert); they never change what the scraper does next.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, err: &CloudInfoError);
}

/// Default handler: logs the error chain at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn handle(&self, err: &CloudInfoError) {
        match err {
            CloudInfoError::ScrapeFailed {
                provider,
                service,
                region,
                source,
            } => error!(%provider, %service, %region, error = %source, "scrape failed"),
            CloudInfoError::Initialization { provider, source } => {
                error!(%provider, error = %source, "price baseline initialization failed")
            }
            other => error!(error = %other, "cloud information error"),
        }
    }
}

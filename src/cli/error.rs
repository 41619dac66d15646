//! CLI error types and conversions

use crate::config::ConfigError;
use crate::fetcher::FetcherError;
use crate::metrics::MetricsError;

/// Startup and runtime failures of the poll command
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigurationError(#[from] ConfigError),

    /// Metrics exporter error
    #[error("metrics error: {0}")]
    MetricsError(#[from] MetricsError),

    /// Fetcher setup error
    #[error("fetcher error: {0}")]
    FetcherError(#[from] FetcherError),

    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    HttpClientError(#[source] reqwest::Error),

    /// The poll task panicked or was aborted
    #[error("poll task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

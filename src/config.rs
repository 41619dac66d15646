//! Runtime configuration loaded from the environment
//!
//! A `.env` file in the working directory is loaded first when present; real
//! environment variables take precedence over it.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetcher::http::DEFAULT_BASE_URL;

/// Personal access token variable (required)
pub const TOKEN_VAR: &str = "ASANA_PAT";

/// Output root directory variable
pub const OUT_DIR_VAR: &str = "OUT_DIR";

/// API base URL override variable
pub const BASE_URL_VAR: &str = "ASANA_BASE_URL";

/// Output root used when `OUT_DIR` is unset
pub const DEFAULT_OUT_DIR: &str = "out";

/// Timeout bounding every individual HTTP request
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The access token is missing or empty
    #[error("ASANA_PAT is not set (.env or env var)")]
    MissingToken,
}

/// Poller configuration
#[derive(Clone)]
pub struct Config {
    /// Bearer token for the Asana API
    pub access_token: String,
    /// Root directory for snapshots
    pub output_dir: PathBuf,
    /// API base URL
    pub base_url: String,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let access_token = non_empty(TOKEN_VAR).ok_or(ConfigError::MissingToken)?;
        let output_dir = non_empty(OUT_DIR_VAR).unwrap_or_else(|| DEFAULT_OUT_DIR.to_string());
        let base_url = non_empty(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            access_token,
            output_dir: PathBuf::from(output_dir),
            base_url,
            http_timeout: HTTP_TIMEOUT,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_token", &"<redacted>")
            .field("output_dir", &self.output_dir)
            .field("base_url", &self.base_url)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

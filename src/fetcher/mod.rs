//! HTTP fetching for the Asana REST API
//!
//! Layered leaf-first:
//! - [`transport`] - sends one GET ([`ReqwestTransport`] in production)
//! - [`http`] - one logical GET with retry, backoff and rate-limit handling
//! - [`pagination`] - walks a cursor-paginated listing through [`http`]
//! - [`asana`] - typed listings for workspaces, users and projects

use reqwest::StatusCode;

pub mod asana;
pub mod http;
pub mod page;
pub mod pagination;
pub mod retry;
pub mod retry_formatter;
pub mod transport;

pub use asana::AsanaClient;
pub use http::ApiHttpClient;
pub use page::{NextPage, Page};
pub use pagination::{PaginationHelper, Resource};
pub use retry::RetryPolicy;
pub use retry_formatter::RetryErrorType;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// No response was received (DNS, connect, timeout, truncated body)
    #[error("GET {url}: {kind}: {message}")]
    Transport {
        /// Request URL
        url: String,
        /// Failure classification
        kind: RetryErrorType,
        /// Underlying error text
        message: String,
    },

    /// Non-retryable HTTP status
    #[error("GET {url}: {status}: {body}")]
    Status {
        /// Request URL
        url: String,
        /// Response status
        status: StatusCode,
        /// Response body
        body: String,
    },

    /// Success response whose body could not be decoded
    #[error("GET {url}: failed to decode response: {source}")]
    Decode {
        /// Request URL
        url: String,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },

    /// Every attempt got a retryable status
    #[error("exhausted retries for {url} after {attempts} attempts")]
    RetriesExhausted {
        /// Request URL
        url: String,
        /// Attempts made
        attempts: u32,
    },

    /// Pagination did not terminate
    #[error("pagination of {resource} exceeded {max_pages} pages")]
    TooManyPages {
        /// Listing being walked
        resource: String,
        /// Page limit that was hit
        max_pages: usize,
    },

    /// Request URL could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Shutdown was requested
    #[error("cancelled by shutdown")]
    Cancelled,
}

impl FetcherError {
    /// Whether this error was caused by a shutdown request
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetcherError::Cancelled)
    }
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

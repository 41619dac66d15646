//! Resilient HTTP client for the Asana REST API
//!
//! Provides a single logical GET with:
//! - Bearer-token authorization and JSON negotiation headers
//! - Retry with exponential backoff on transport failures and 5xx responses
//! - `Retry-After` aware delays on 429 responses
//! - Cooperative cancellation before each attempt, during the request and while sleeping

use chrono::Utc;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use super::retry::{parse_retry_after, RetryPolicy};
use super::retry_formatter::{classify_status, RetryContext, RetryErrorType};
use super::transport::{HttpRequest, HttpResponse, HttpTransport};
use super::{FetcherError, FetcherResult};
use crate::metrics::{record_retry_backoff, HttpRequestMetrics};
use crate::shutdown::ShutdownCoordinator;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://app.asana.com/api/1.0";

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("asana-poller/", env!("CARGO_PKG_VERSION"));

/// What the retry loop should do after one attempt
enum AttemptOutcome<T> {
    Done(T),
    Retry {
        kind: RetryErrorType,
        delay: Duration,
        message: String,
    },
}

/// Authenticated, retrying HTTP client
pub struct ApiHttpClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    token: String,
    policy: RetryPolicy,
}

impl ApiHttpClient {
    /// Create new HTTP client
    ///
    /// # Arguments
    /// * `transport` - Transport used to send requests
    /// * `base_url` - API base URL (e.g., "<https://app.asana.com/api/1.0>")
    /// * `token` - Personal access token sent as a bearer token
    ///
    /// # Errors
    /// Returns [`FetcherError::InvalidUrl`] when `base_url` is not an absolute URL
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: &str,
        token: impl Into<String>,
    ) -> FetcherResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| FetcherError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            transport,
            base_url,
            token: token.into(),
            policy: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// API base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Maximum attempts per logical request
    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }

    /// Build the URL for `path` below the base URL with the given query pairs.
    pub fn endpoint_url(&self, path: &str, params: &[(&str, &str)]) -> FetcherResult<Url> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url =
            Url::parse(&raw).map_err(|e| FetcherError::InvalidUrl(format!("{raw}: {e}")))?;

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter().copied());
        }
        Ok(url)
    }

    /// Execute a GET request and decode the JSON body as `T`
    ///
    /// Transport failures and 5xx responses sleep for the current backoff;
    /// 429 responses sleep for the `Retry-After` hint when present, otherwise the
    /// current backoff. Either way the backoff then doubles up to its cap.
    /// Other statuses and undecodable 2xx bodies end the call immediately.
    ///
    /// # Errors
    /// - [`FetcherError::Cancelled`] once `shutdown` fires
    /// - [`FetcherError::Status`] for non-retryable statuses
    /// - [`FetcherError::Decode`] for malformed success bodies
    /// - the last [`FetcherError::Transport`] or [`FetcherError::RetriesExhausted`]
    ///   when every attempt failed
    pub async fn get<T>(&self, url: &Url, shutdown: &ShutdownCoordinator) -> FetcherResult<T>
    where
        T: DeserializeOwned,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut backoff = self.policy.initial_backoff.min(self.policy.max_backoff);
        let mut last_transport_error = None;
        let mut last_context: Option<RetryContext> = None;

        for attempt in 1..=max_attempts {
            if shutdown.is_shutdown_requested() {
                debug!(url = %url, attempt, "Shutdown requested before attempt");
                return Err(FetcherError::Cancelled);
            }

            let request = self.build_request(url);
            let request_metrics = HttpRequestMetrics::start(url.path(), attempt);

            let result = tokio::select! {
                result = self.transport.execute(&request) => result,
                _ = shutdown.wait_for_shutdown() => {
                    debug!(url = %url, attempt, "Request abandoned due to shutdown");
                    return Err(FetcherError::Cancelled);
                }
            };

            let outcome = match result {
                Ok(response) => {
                    request_metrics.record_complete(response.status.as_u16());
                    self.handle_response(url, response, backoff)?
                }
                Err(err) => {
                    request_metrics.record_network_error();
                    warn!(
                        "Network error on attempt {}/{}: {}",
                        attempt, max_attempts, err
                    );
                    let message = err.to_string();
                    let kind = err.kind;
                    last_transport_error = Some(FetcherError::Transport {
                        url: url.to_string(),
                        kind,
                        message: err.message,
                    });
                    AttemptOutcome::Retry {
                        kind,
                        delay: backoff,
                        message,
                    }
                }
            };

            let (kind, delay, message) = match outcome {
                AttemptOutcome::Done(value) => {
                    if let Some(mut recovered) = last_context {
                        recovered.attempt = attempt;
                        info!("{}", recovered.format_success());
                    } else {
                        debug!("Request succeeded on attempt {}", attempt);
                    }
                    return Ok(value);
                }
                AttemptOutcome::Retry {
                    kind,
                    delay,
                    message,
                } => (kind, delay, message),
            };

            let context = RetryContext::new(
                attempt,
                max_attempts,
                kind,
                delay,
                message,
                url.as_str(),
            );

            if attempt == max_attempts {
                last_context = Some(context);
                break;
            }

            warn!("{}", context.format_retry());
            record_retry_backoff(delay, attempt);
            last_context = Some(context);

            if !shutdown.sleep_or_shutdown(delay).await {
                debug!(url = %url, "Backoff interrupted by shutdown");
                return Err(FetcherError::Cancelled);
            }

            backoff = self.policy.next_backoff(backoff);
        }

        if let Some(context) = &last_context {
            error!("{}", context.format_failure());
        }

        // All attempts exhausted
        Err(last_transport_error.unwrap_or_else(|| FetcherError::RetriesExhausted {
            url: url.to_string(),
            attempts: max_attempts,
        }))
    }

    fn build_request(&self, url: &Url) -> HttpRequest {
        HttpRequest {
            url: url.clone(),
            headers: vec![
                ("Authorization", format!("Bearer {}", self.token)),
                ("Accept", "application/json".to_string()),
                ("User-Agent", USER_AGENT.to_string()),
            ],
        }
    }

    fn handle_response<T>(
        &self,
        url: &Url,
        response: HttpResponse,
        backoff: Duration,
    ) -> FetcherResult<AttemptOutcome<T>>
    where
        T: DeserializeOwned,
    {
        let status = response.status;

        if status.is_success() {
            return serde_json::from_slice(&response.body)
                .map(AttemptOutcome::Done)
                .map_err(|source| FetcherError::Decode {
                    url: url.to_string(),
                    source,
                });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let hint = response
                .retry_after
                .as_deref()
                .and_then(|value| parse_retry_after(value, Utc::now()));
            if let Some(hint) = hint {
                debug!("Server requested a delay of {:?}", hint);
            }
            return Ok(AttemptOutcome::Retry {
                kind: RetryErrorType::RateLimit,
                delay: hint.unwrap_or(backoff),
                message: format!("{status}"),
            });
        }

        if status.is_server_error() {
            return Ok(AttemptOutcome::Retry {
                kind: classify_status(status),
                delay: backoff,
                message: format!("{status}: {}", String::from_utf8_lossy(&response.body)),
            });
        }

        // Don't retry on client errors (4xx, except 429) or anything else unexpected
        Err(FetcherError::Status {
            url: url.to_string(),
            status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        })
    }
}

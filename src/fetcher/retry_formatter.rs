//! Retry message formatting for the resilient HTTP client.
//!
//! Classifies transport failures and HTTP statuses into [`RetryErrorType`] and
//! renders consistent log lines for retries, recoveries and final failures.

use reqwest::{Error as ReqwestError, StatusCode};
use std::fmt;
use std::time::Duration;

/// Classification of retry errors for user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorType {
    /// Network timeout or connection stalled long enough to trigger a timeout
    NetworkTimeout,
    /// Connection refused, DNS failure, or other offline scenarios
    NetworkOffline,
    /// HTTP 429 rate limit exceeded
    RateLimit,
    /// HTTP 5xx server error
    ServerError(u16),
    /// HTTP 400 invalid request
    InvalidRequest,
    /// Authentication failures (401/403)
    AuthFailed(u16),
    /// Other client errors (4xx, except 429)
    ClientError(u16),
    /// Generic fallback when no better classification fits
    NetworkGeneric,
}

impl RetryErrorType {
    /// User-friendly description string used inside retry log messages.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "network timeout",
            Self::NetworkOffline => "connection failed",
            Self::RateLimit => "rate limit exceeded",
            Self::ServerError(code) => match code {
                500 => "internal server error",
                502 => "bad gateway",
                503 => "service unavailable",
                504 => "gateway timeout",
                _ => "server error",
            },
            Self::InvalidRequest => "invalid request",
            Self::AuthFailed(code) => match code {
                401 => "authentication failed (401)",
                403 => "authentication failed (403)",
                _ => "authentication failed",
            },
            Self::ClientError(code) => match code {
                402 => "payment required",
                404 => "resource not found",
                _ => "client error",
            },
            Self::NetworkGeneric => "network error",
        }
    }

    /// Suggested remediation presented with actionable guidance after failures.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "Check your network connection and firewall settings",
            Self::NetworkOffline => "Verify internet connectivity and DNS resolution",
            Self::RateLimit => "Use the long polling interval or wait for the quota window to reset",
            Self::ServerError(_) => "Asana may be experiencing issues, the next cycle will try again",
            Self::InvalidRequest => "Check the request parameters and base URL",
            Self::AuthFailed(_) => "Verify that ASANA_PAT is valid and has not been revoked",
            Self::ClientError(_) => "Check that the workspace still exists and is visible to the token",
            Self::NetworkGeneric => "Check network connectivity and try again",
        }
    }

    /// Determine whether the error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            RetryErrorType::InvalidRequest
                | RetryErrorType::AuthFailed(_)
                | RetryErrorType::ClientError(_)
        )
    }
}

impl fmt::Display for RetryErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Context for formatting retry messages.
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Current attempt number (1-based)
    pub attempt: u32,
    /// Maximum number of attempts configured
    pub max_attempts: u32,
    /// Type of error that triggered retry
    pub error_type: RetryErrorType,
    /// Delay until next attempt
    pub backoff_duration: Duration,
    /// Original error message for details
    pub error_message: String,
    /// URL that failed
    pub endpoint: String,
}

impl RetryContext {
    /// Convenience constructor used throughout the retry logic.
    pub fn new(
        attempt: u32,
        max_attempts: u32,
        error_type: RetryErrorType,
        backoff_duration: Duration,
        error_message: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            attempt,
            max_attempts,
            error_type,
            backoff_duration,
            error_message: error_message.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Format standardized retry message with attempt counters and context.
    pub fn format_retry(&self) -> String {
        format!(
            "Retrying (attempt {}/{}) after {} - waiting {:.1} seconds... ({})",
            self.attempt,
            self.max_attempts,
            self.error_type.description(),
            self.backoff_duration.as_secs_f64(),
            self.endpoint
        )
    }

    /// Format retry success message when a previous attempt eventually works.
    pub fn format_success(&self) -> String {
        format!(
            "Retry attempt {}/{} succeeded ({})",
            self.attempt, self.max_attempts, self.endpoint
        )
    }

    /// Format final failure summary with actionable suggestions.
    pub fn format_failure(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "[FAILED] Request failed after {} attempts",
            self.max_attempts
        ));
        lines.push(format!("  Last error: {}", self.error_message));
        lines.push(format!("  Endpoint: {}", self.endpoint));
        lines.push("  Suggestions:".to_string());

        for suggestion in self.format_suggestions() {
            lines.push(format!("    - {suggestion}"));
        }

        lines.join("\n")
    }

    /// Derive suggestions tailored to the current retry context.
    pub fn format_suggestions(&self) -> Vec<String> {
        vec![
            self.error_type.suggestion().to_string(),
            "Check Asana platform status at https://status.asana.com".to_string(),
        ]
    }
}

/// Classify an HTTP status into a [`RetryErrorType`].
pub fn classify_status(status: StatusCode) -> RetryErrorType {
    match status.as_u16() {
        400 => RetryErrorType::InvalidRequest,
        401 | 403 => RetryErrorType::AuthFailed(status.as_u16()),
        429 => RetryErrorType::RateLimit,
        code if status.is_server_error() => RetryErrorType::ServerError(code),
        code if status.is_client_error() => RetryErrorType::ClientError(code),
        _ => RetryErrorType::NetworkGeneric,
    }
}

/// Classify a reqwest transport error into a [`RetryErrorType`].
pub fn classify_transport_error(err: &ReqwestError) -> RetryErrorType {
    if err.is_timeout() {
        return RetryErrorType::NetworkTimeout;
    }

    if err.is_connect() {
        return RetryErrorType::NetworkOffline;
    }

    RetryErrorType::NetworkGeneric
}

//! Unit tests for retry log message formatting

use asana_poller::fetcher::retry_formatter::{classify_status, RetryContext};
use asana_poller::fetcher::RetryErrorType;
use reqwest::StatusCode;
use std::time::Duration;

const ENDPOINT: &str = "https://app.asana.com/api/1.0/users?limit=100&workspace=w1";

#[test]
fn test_retry_message_for_rate_limit() {
    let context = RetryContext::new(
        2,
        6,
        RetryErrorType::RateLimit,
        Duration::from_secs(30),
        "429 Too Many Requests",
        ENDPOINT,
    );

    assert_eq!(
        context.format_retry(),
        format!("Retrying (attempt 2/6) after rate limit exceeded - waiting 30.0 seconds... ({ENDPOINT})")
    );
}

#[test]
fn test_retry_message_for_server_error() {
    let context = RetryContext::new(
        1,
        6,
        classify_status(StatusCode::BAD_GATEWAY),
        Duration::from_millis(1500),
        "502 Bad Gateway",
        ENDPOINT,
    );

    let message = context.format_retry();
    assert!(message.contains("bad gateway"));
    assert!(message.contains("waiting 1.5 seconds"));
}

#[test]
fn test_success_message() {
    let context = RetryContext::new(
        3,
        6,
        RetryErrorType::NetworkTimeout,
        Duration::from_secs(4),
        "timed out",
        ENDPOINT,
    );

    assert_eq!(
        context.format_success(),
        format!("Retry attempt 3/6 succeeded ({ENDPOINT})")
    );
}

#[test]
fn test_failure_summary_includes_suggestions() {
    let context = RetryContext::new(
        6,
        6,
        RetryErrorType::ServerError(503),
        Duration::from_secs(32),
        "503 Service Unavailable",
        ENDPOINT,
    );

    let summary = context.format_failure();
    assert!(summary.starts_with("[FAILED] Request failed after 6 attempts"));
    assert!(summary.contains("Last error: 503 Service Unavailable"));
    assert!(summary.contains(&format!("Endpoint: {ENDPOINT}")));
    assert!(summary.contains("status.asana.com"));
}

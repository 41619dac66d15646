//! Retry policy, backoff calculation and `Retry-After` parsing

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::Duration;

/// Maximum number of attempts for a single logical request.
pub const MAX_ATTEMPTS: u32 = 6;

/// Initial backoff delay.
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Upper bound for the backoff delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(32);

/// Retry budget and backoff bounds for one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Ceiling for the doubling backoff
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Double `current`, capped at [`RetryPolicy::max_backoff`].
    pub fn next_backoff(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_backoff)
    }

    /// Backoff applied after `retry_count` previous retryable failures.
    pub fn backoff_for(&self, retry_count: u32) -> Duration {
        (0..retry_count).fold(self.initial_backoff.min(self.max_backoff), |delay, _| {
            self.next_backoff(delay)
        })
    }
}

/// Parse a `Retry-After` header value.
///
/// Accepts delta-seconds or an HTTP-date in any of the three forms of
/// RFC 9110 (IMF-fixdate, RFC 850, asctime). Returns `None` for missing, zero,
/// negative, past or unparsable values so the caller falls back to its backoff.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(secs) = value.parse::<i64>() {
        return u64::try_from(secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
    }

    let at = parse_http_date(value)?;
    (at - now).to_std().ok().filter(|delay| !delay.is_zero())
}

/// Parse an HTTP-date, always interpreted as UTC
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc2822(value) {
        return Some(at.with_timezone(&Utc));
    }

    // asctime pads single-digit days with a second space
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %d %H:%M:%S %Y"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
        .map(|naive| naive.and_utc())
}

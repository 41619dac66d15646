//! Production observability metrics for the Asana poller
//!
//! This module records request outcomes, 429 responses, retry backoff and
//! collection-cycle health.
//!
//! ## Architecture
//!
//! - Uses the `metrics` facade, so recording is a no-op until a recorder is installed
//! - Optional Prometheus exporter for a scrape endpoint (`--metrics-addr`)
//! - Every recorder also emits a structured `tracing` event

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Global metrics registry initialization flag
static METRICS_INITIALIZED: Lazy<Arc<RwLock<bool>>> = Lazy::new(|| Arc::new(RwLock::new(false)));

/// Correlation ID generator for request tracing
static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Metrics initialization errors
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// The Prometheus exporter could not be installed
    #[error("failed to install Prometheus exporter on {addr}: {message}")]
    Install {
        /// Requested listen address
        addr: SocketAddr,
        /// Underlying error text
        message: String,
    },
}

/// Initialize metrics system with Prometheus exporter
///
/// Idempotent: a second call is a no-op.
///
/// # Arguments
/// * `addr` - Socket address to bind the Prometheus scrape endpoint (e.g., "0.0.0.0:9090")
pub async fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    let mut initialized = METRICS_INITIALIZED.write().await;
    if *initialized {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError::Install {
            addr,
            message: e.to_string(),
        })?;

    describe_counter!(
        "http_requests_total",
        Unit::Count,
        "Total number of HTTP requests made to the Asana API"
    );

    describe_counter!(
        "http_429_errors_total",
        Unit::Count,
        "Total number of 429 rate limit responses received"
    );

    describe_counter!(
        "http_retries_total",
        Unit::Count,
        "Total number of retry attempts"
    );

    describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request duration in seconds"
    );

    describe_histogram!(
        "retry_backoff_duration_seconds",
        Unit::Seconds,
        "Delay slept before a retry in seconds"
    );

    describe_counter!(
        "poll_cycles_total",
        Unit::Count,
        "Total number of collection cycles by outcome"
    );

    describe_histogram!(
        "poll_cycle_duration_seconds",
        Unit::Seconds,
        "Collection cycle duration in seconds"
    );

    describe_counter!(
        "records_written_total",
        Unit::Count,
        "Total number of records written to snapshots"
    );

    *initialized = true;
    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Generate a new correlation ID for request tracing
pub fn generate_correlation_id() -> String {
    let id = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("req-{id:08x}")
}

/// Record an HTTP request with timing
pub struct HttpRequestMetrics {
    endpoint: String,
    start_time: Instant,
    correlation_id: String,
    attempt: u32,
}

impl HttpRequestMetrics {
    /// Start recording a new HTTP request
    pub fn start(endpoint: impl Into<String>, attempt: u32) -> Self {
        let endpoint = endpoint.into();
        let correlation_id = generate_correlation_id();

        debug!(
            correlation_id = %correlation_id,
            endpoint = %endpoint,
            attempt = attempt,
            "Starting HTTP request"
        );

        Self {
            endpoint,
            start_time: Instant::now(),
            correlation_id,
            attempt,
        }
    }

    /// Record completion of the HTTP request
    pub fn record_complete(&self, status_code: u16) {
        let duration = self.start_time.elapsed();

        counter!(
            "http_requests_total",
            "endpoint" => self.endpoint.clone(),
            "status" => status_code.to_string(),
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "endpoint" => self.endpoint.clone(),
        )
        .record(duration.as_secs_f64());

        if status_code == 429 {
            counter!(
                "http_429_errors_total",
                "endpoint" => self.endpoint.clone(),
            )
            .increment(1);

            warn!(
                correlation_id = %self.correlation_id,
                endpoint = %self.endpoint,
                attempt = self.attempt,
                duration_ms = duration.as_millis(),
                "Rate limit response (429) received"
            );
        }

        debug!(
            correlation_id = %self.correlation_id,
            endpoint = %self.endpoint,
            status = status_code,
            duration_ms = duration.as_millis(),
            "HTTP request completed"
        );
    }

    /// Record a transport error (no status code)
    pub fn record_network_error(&self) {
        let duration = self.start_time.elapsed();

        counter!(
            "http_requests_total",
            "endpoint" => self.endpoint.clone(),
            "status" => "network_error",
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "endpoint" => self.endpoint.clone(),
        )
        .record(duration.as_secs_f64());

        warn!(
            correlation_id = %self.correlation_id,
            endpoint = %self.endpoint,
            attempt = self.attempt,
            duration_ms = duration.as_millis(),
            "Network error recorded"
        );
    }

    /// Get the correlation ID for this request
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Record the delay slept before a retry
pub fn record_retry_backoff(duration: Duration, attempt: u32) {
    counter!(
        "http_retries_total",
        "attempt" => attempt.to_string(),
    )
    .increment(1);

    histogram!("retry_backoff_duration_seconds").record(duration.as_secs_f64());

    debug!(
        attempt = attempt,
        backoff_ms = duration.as_millis(),
        "Retry backoff recorded"
    );
}

/// Record records persisted to a snapshot file
pub fn record_records_written(kind: &'static str, count: usize) {
    counter!("records_written_total", "kind" => kind).increment(count as u64);
}

/// Collection cycle metrics
pub struct CycleMetrics {
    cycle: u64,
    start_time: Instant,
}

impl CycleMetrics {
    /// Start tracking a collection cycle
    pub fn start(cycle: u64) -> Self {
        debug!(cycle = cycle, "Collection cycle started");

        Self {
            cycle,
            start_time: Instant::now(),
        }
    }

    /// Time since the cycle started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Record a completed cycle
    pub fn record_success(&self, workspaces: usize, failed_workspaces: usize) {
        let duration = self.start_time.elapsed();
        let outcome = if failed_workspaces == 0 {
            "success"
        } else {
            "partial"
        };

        counter!("poll_cycles_total", "outcome" => outcome).increment(1);
        histogram!("poll_cycle_duration_seconds").record(duration.as_secs_f64());

        info!(
            cycle = self.cycle,
            workspaces = workspaces,
            failed_workspaces = failed_workspaces,
            duration_ms = duration.as_millis(),
            "Collection cycle completed"
        );
    }

    /// Record a failed cycle
    pub fn record_failure(&self, error: &str) {
        let duration = self.start_time.elapsed();

        counter!("poll_cycles_total", "outcome" => "failed").increment(1);
        histogram!("poll_cycle_duration_seconds").record(duration.as_secs_f64());

        error!(
            cycle = self.cycle,
            error = %error,
            duration_ms = duration.as_millis(),
            "Collection cycle failed"
        );
    }

    /// Record a cycle abandoned because shutdown was requested
    pub fn record_cancelled(&self) {
        counter!("poll_cycles_total", "outcome" => "cancelled").increment(1);

        info!(
            cycle = self.cycle,
            duration_ms = self.start_time.elapsed().as_millis(),
            "Collection cycle cancelled by shutdown"
        );
    }
}

//! Graceful shutdown coordination utilities.
//!
//! Provides a lightweight [`ShutdownCoordinator`] that is threaded through every
//! blocking operation of a poll cycle (HTTP calls, backoff sleeps, the interval
//! wait) so that SIGINT/SIGTERM interrupts them cooperatively instead of letting
//! them run to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{info, warn};

/// Shared handle to a shutdown coordinator.
pub type SharedShutdown = Arc<ShutdownCoordinator>;

/// Coordinates graceful shutdown across async tasks.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    is_shutdown: AtomicBool,
    notify: Notify,
}

impl ShutdownCoordinator {
    /// Create a new coordinator.
    pub fn new() -> Self {
        Self {
            is_shutdown: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Create a new shared coordinator wrapped in [`Arc`].
    pub fn shared() -> SharedShutdown {
        Arc::new(Self::new())
    }

    /// Request shutdown. Notifies all registered waiters exactly once.
    pub fn request_shutdown(&self) {
        if !self.is_shutdown.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.is_shutdown.load(Ordering::SeqCst)
    }

    /// Wait until shutdown is requested. Returns immediately if already set.
    pub async fn wait_for_shutdown(&self) {
        // Register interest before reading the flag, otherwise a request landing
        // between the check and the await would be missed.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.is_shutdown_requested() {
            return;
        }
        notified.await;
    }

    /// Sleep for `duration` unless shutdown is requested first.
    ///
    /// Returns `true` when the full duration elapsed and `false` when the sleep
    /// was cut short by a shutdown request.
    pub async fn sleep_or_shutdown(&self, duration: Duration) -> bool {
        if self.is_shutdown_requested() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.wait_for_shutdown() => false,
        }
    }
}

/// Request shutdown on the first SIGINT (Ctrl+C) or, on unix, SIGTERM.
///
/// Intended to be spawned once at startup.
pub async fn listen_for_signals(shutdown: SharedShutdown) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        if let Err(e) = result {
                            warn!("Failed to listen for Ctrl+C: {}", e);
                            return;
                        }
                        info!(signal = "SIGINT", "signal received, shutting down");
                    }
                    _ = terminate.recv() => {
                        info!(signal = "SIGTERM", "signal received, shutting down");
                    }
                }
                shutdown.request_shutdown();
                return;
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {}", e),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!(signal = "SIGINT", "signal received, shutting down");
            shutdown.request_shutdown();
        }
        Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
    }
}

use std::time::Duration;

use asana_poller::cli::Cli;
use asana_poller::config::HTTP_TIMEOUT;
use asana_poller::{Config, ShutdownCoordinator};
use clap::Parser;
use tempfile::TempDir;

#[tokio::test]
async fn shutdown_notifies_waiters() {
    let shutdown = ShutdownCoordinator::shared();
    let waiter = {
        let handle = shutdown.clone();
        tokio::spawn(async move {
            handle.wait_for_shutdown().await;
            true
        })
    };

    // Give the task time to start waiting
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.request_shutdown();

    let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
    assert!(result.is_ok());
}

/// A request landing before the waiter registers must not be missed.
#[tokio::test]
async fn shutdown_requested_before_wait_no_deadlock() {
    let shutdown = ShutdownCoordinator::shared();
    shutdown.request_shutdown();

    let handle = shutdown.clone();
    let waiter = tokio::spawn(async move {
        handle.wait_for_shutdown().await;
        true
    });

    let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
    assert!(result.is_ok(), "wait_for_shutdown() deadlocked despite shutdown already requested");
}

#[tokio::test]
async fn shutdown_concurrent_waiters_all_notified() {
    let shutdown = ShutdownCoordinator::shared();

    let mut waiters = Vec::new();
    for _ in 0..10 {
        let handle = shutdown.clone();
        waiters.push(tokio::spawn(async move {
            handle.wait_for_shutdown().await;
        }));
    }

    tokio::time::sleep(Duration::from_millis(10)).await;
    shutdown.request_shutdown();

    for waiter in waiters {
        let result = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(result.is_ok(), "a waiter was never notified");
    }
}

/// The poll command keeps retrying an unreachable API until shutdown, then
/// returns promptly instead of finishing its backoff schedule.
#[tokio::test]
async fn poll_command_stops_on_shutdown() {
    let temp_dir = TempDir::new().unwrap();
    // Bind then drop a listener to get a local port with nothing behind it
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let config = Config {
        access_token: "test-token".to_string(),
        output_dir: temp_dir.path().to_path_buf(),
        base_url: format!("http://{addr}/api/1.0"),
        http_timeout: HTTP_TIMEOUT,
    };
    let cli = Cli::try_parse_from(["asana-poller", "--short-interval"]).unwrap();

    let shutdown = ShutdownCoordinator::shared();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.request_shutdown();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        cli.execute_with_config(config, shutdown),
    )
    .await
    .expect("poll command did not stop after shutdown");

    assert!(result.is_ok());
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

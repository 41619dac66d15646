//! Integration tests for one workspace collection cycle against a fake API

use asana_poller::fetcher::{AsanaClient, HttpRequest};
use asana_poller::poller::{CollectError, Collector, WorkspaceCollector};
use asana_poller::{Project, ShutdownCoordinator, User};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

use crate::support::{client, page, status_response, FakeTransport, Reply};

/// Two workspaces; the second has a name that sanitizes to nothing
fn fake_api(request: &HttpRequest) -> Reply {
    let path = request.url.path();
    let workspace = request.query_param("workspace");

    if path.ends_with("/workspaces") {
        return Ok(page(
            json!([{"gid": "w1", "name": "Acme: Design"}, {"gid": "w2", "name": ""}]),
            None,
        ));
    }

    match (path.rsplit('/').next(), workspace.as_deref()) {
        (Some("users"), Some("w1")) => Ok(page(
            json!([
                {"gid": "u1", "name": "Alice", "email": "alice@example.com", "resource_type": "user"},
                {"gid": "u2", "name": "Bob", "resource_type": "user"}
            ]),
            None,
        )),
        (Some("projects"), Some("w1")) => Ok(page(
            json!([{"gid": "p1", "name": "Roadmap", "archived": false, "resource_type": "project"}]),
            None,
        )),
        (Some("users"), Some("w2")) | (Some("projects"), Some("w2")) => Ok(page(json!([]), None)),
        _ => Ok(status_response(404)),
    }
}

fn read_json(path: std::path::PathBuf) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_cycle_writes_snapshots_per_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let transport = FakeTransport::new(|request, _| fake_api(request));
    let collector = WorkspaceCollector::new(AsanaClient::new(client(&transport)), temp_dir.path());
    let shutdown = ShutdownCoordinator::new();

    let report = collector.collect_cycle(&shutdown).await.unwrap();

    assert_eq!(report.workspaces, 2);
    assert_eq!(report.users, 2);
    assert_eq!(report.projects, 1);
    assert!(report.failed_workspaces.is_empty());

    let acme = temp_dir.path().join("Acme_ Design");
    let users: Vec<User> =
        serde_json::from_value(read_json(acme.join("users.json"))).unwrap();
    assert_eq!(users[0].email.as_deref(), Some("alice@example.com"));
    assert_eq!(users[1].name, "Bob");

    let projects: Vec<Project> =
        serde_json::from_value(read_json(acme.join("projects.json"))).unwrap();
    assert_eq!(projects[0].name, "Roadmap");

    // Unnamed workspace falls back to its gid
    assert_eq!(read_json(temp_dir.path().join("w2").join("users.json")), json!([]));
}

#[tokio::test(start_paused = true)]
async fn test_failed_resource_does_not_stop_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let transport = FakeTransport::new(|request, _| {
        if request.url.path().ends_with("/projects")
            && request.query_param("workspace").as_deref() == Some("w1")
        {
            return Ok(status_response(403));
        }
        fake_api(request)
    });
    let collector = WorkspaceCollector::new(AsanaClient::new(client(&transport)), temp_dir.path());
    let shutdown = ShutdownCoordinator::new();

    let report = collector.collect_cycle(&shutdown).await.unwrap();

    assert_eq!(report.failed_workspaces, vec!["Acme: Design".to_string()]);
    assert_eq!(report.workspaces, 2);
    assert!(temp_dir.path().join("Acme_ Design").join("users.json").exists());
    assert!(!temp_dir.path().join("Acme_ Design").join("projects.json").exists());
    assert!(temp_dir.path().join("w2").join("projects.json").exists());
}

#[tokio::test(start_paused = true)]
async fn test_workspace_listing_failure_fails_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let transport = FakeTransport::always(401);
    let collector = WorkspaceCollector::new(AsanaClient::new(client(&transport)), temp_dir.path());
    let shutdown = ShutdownCoordinator::new();

    let result = collector.collect_cycle(&shutdown).await;

    assert!(matches!(result, Err(CollectError::Workspaces(_))));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_skips_remaining_calls() {
    let temp_dir = TempDir::new().unwrap();
    let shutdown = ShutdownCoordinator::shared();
    let trigger = Arc::clone(&shutdown);
    let transport = FakeTransport::new(move |request, _| {
        if request.url.path().ends_with("/users") {
            trigger.request_shutdown();
        }
        fake_api(request)
    });
    let collector = WorkspaceCollector::new(AsanaClient::new(client(&transport)), temp_dir.path());

    let result = collector.collect_cycle(&shutdown).await;

    assert!(matches!(result, Err(CollectError::Cancelled)));
    let paths: Vec<String> = transport
        .requests()
        .iter()
        .map(|recorded| recorded.request.url.path().to_string())
        .collect();
    assert_eq!(paths, vec!["/api/1.0/workspaces", "/api/1.0/users"]);
}

//! Unit tests for snapshot directory naming and layout

use asana_poller::output::{safe_dir_name, workspace_dir, JsonSnapshotWriter, USERS_FILE};
use asana_poller::User;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_safe_dir_name_examples() {
    assert_eq!(safe_dir_name("Acme Corp", "1"), "Acme Corp");
    assert_eq!(safe_dir_name("Acme/Corp: HQ", "1"), "Acme_Corp_ HQ");
    assert_eq!(safe_dir_name("  spaced   out  ", "1"), " spaced out ");
    assert_eq!(safe_dir_name("#$%", "1"), "_");
}

#[test]
fn test_safe_dir_name_is_deterministic() {
    let name = "Marketing & Sales (EU)";
    assert_eq!(safe_dir_name(name, "1"), safe_dir_name(name, "1"));
    assert_eq!(safe_dir_name(name, "1"), "Marketing _ Sales _EU_");
}

#[test]
fn test_empty_name_falls_back_to_gid() {
    assert_eq!(
        workspace_dir(Path::new("out"), "", "120000"),
        Path::new("out").join("120000")
    );
}

#[test]
fn test_snapshot_layout() {
    let temp_dir = TempDir::new().unwrap();
    let users = vec![User {
        gid: "u1".to_string(),
        name: "Alice".to_string(),
        email: Some("alice@example.com".to_string()),
    }];

    let dir = workspace_dir(temp_dir.path(), "Acme: Design", "w1");
    let path = JsonSnapshotWriter::new().write(&dir, USERS_FILE, &users).unwrap();

    assert_eq!(path, temp_dir.path().join("Acme_ Design").join("users.json"));
    let written: Vec<User> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, users);
}

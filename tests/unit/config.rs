//! Unit tests for configuration loading

use asana_poller::config::{ConfigError, DEFAULT_OUT_DIR};
use asana_poller::Config;
use std::path::PathBuf;

#[test]
fn test_whitespace_token_is_missing() {
    let result = Config::from_lookup(|key| (key == "ASANA_PAT").then(|| "   ".to_string()));
    assert!(matches!(result, Err(ConfigError::MissingToken)));
}

#[test]
fn test_missing_token_message_names_variable() {
    let err = Config::from_lookup(|_| None).unwrap_err();
    assert!(err.to_string().contains("ASANA_PAT"));
}

#[test]
fn test_empty_out_dir_uses_default() {
    let config = Config::from_lookup(|key| match key {
        "ASANA_PAT" => Some("token".to_string()),
        "OUT_DIR" => Some(String::new()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.output_dir, PathBuf::from(DEFAULT_OUT_DIR));
}

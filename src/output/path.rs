//! Directory naming for workspace snapshots
//!
//! Each workspace gets one directory below the output root, named after its
//! display name: `out/{workspace name}/users.json`.
//!
//! # Usage Example
//!
//! ```rust
//! use asana_poller::output::{safe_dir_name, workspace_dir};
//! use std::path::Path;
//!
//! assert_eq!(safe_dir_name("Acme: Design/Ops", "123"), "Acme_ Design_Ops");
//! assert_eq!(safe_dir_name("***", "123"), "_");
//! assert_eq!(safe_dir_name("", "123"), "123");
//!
//! let dir = workspace_dir(Path::new("out"), "Acme", "123");
//! assert_eq!(dir, Path::new("out").join("Acme"));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Runs of anything outside letters, digits, dot, underscore, space and dash
static INVALID_DIR_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-zA-Z0-9._ -]+").expect("valid directory character pattern")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Sanitize a display name into a single safe path component
///
/// Every run of disallowed characters becomes one `_`, whitespace runs collapse
/// to a single space. Falls back to `fallback` (typically the gid) when nothing
/// usable remains, including the special components `.` and `..`.
pub fn safe_dir_name(name: &str, fallback: &str) -> String {
    let replaced = INVALID_DIR_CHARS.replace_all(name, "_");
    let collapsed = WHITESPACE_RUN.replace_all(&replaced, " ");

    match collapsed.as_ref() {
        "" | "." | ".." => fallback.to_string(),
        safe => safe.to_string(),
    }
}

/// Directory holding the snapshots of one workspace
pub fn workspace_dir(root: &Path, name: &str, gid: &str) -> PathBuf {
    root.join(safe_dir_name(name, gid))
}

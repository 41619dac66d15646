//! Snapshot output writers
//!
//! - [`path`] - deterministic, filesystem-safe directory names per workspace
//! - [`json`] - atomic, indented JSON snapshot files

use std::path::PathBuf;

pub mod json;
pub mod path;

pub use json::JsonSnapshotWriter;
pub use path::{safe_dir_name, workspace_dir};

/// File name of the users snapshot inside a workspace directory
pub const USERS_FILE: &str = "users.json";

/// File name of the projects snapshot inside a workspace directory
pub const PROJECTS_FILE: &str = "projects.json";

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error on {}: {source}", path.display())]
    IoError {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

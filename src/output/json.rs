//! JSON snapshot writer
//!
//! Snapshots are written to a temporary file in the target directory and then
//! renamed over the destination, so readers only ever see complete documents.

use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use super::{OutputError, OutputResult};

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// Writes values as two-space indented JSON documents
#[derive(Debug, Clone, Copy)]
pub struct JsonSnapshotWriter {
    buffer_size: usize,
}

impl Default for JsonSnapshotWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSnapshotWriter {
    /// Create a writer with the default buffer size
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    /// Create a writer with a custom buffer size
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    /// Write `value` to `dir/file_name`, creating `dir` if needed
    ///
    /// # Returns
    /// Path of the written file
    pub fn write<T>(&self, dir: &Path, file_name: &str, value: &T) -> OutputResult<PathBuf>
    where
        T: Serialize + ?Sized,
    {
        std::fs::create_dir_all(dir).map_err(|source| OutputError::IoError {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(file_name);
        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| OutputError::IoError {
            path: dir.to_path_buf(),
            source,
        })?;

        let tmp_path = tmp.path().to_path_buf();
        {
            let mut writer = BufWriter::with_capacity(self.buffer_size, tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer
                .write_all(b"\n")
                .and_then(|_| writer.flush())
                .map_err(|source| OutputError::IoError {
                    path: tmp_path,
                    source,
                })?;
        }

        tmp.persist(&path).map_err(|err| OutputError::IoError {
            path: path.clone(),
            source: err.error,
        })?;

        debug!(path = %path.display(), "Snapshot written");
        Ok(path)
    }
}

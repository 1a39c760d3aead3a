//! Record sinks
//!
//! A sink persists a record under a destination key. The crawler uses two
//! kinds of artifact: one per successfully detailed item, and one combined
//! run result written at finalization.

use crate::records::{DetailRecord, RunResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while persisting a record
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid artifact key: '{0}'")]
    InvalidKey(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for crawl artifacts
pub trait RecordSink: Send + Sync {
    /// Persists one item's detail record under `key`
    ///
    /// # Returns
    ///
    /// The location the record was written to
    fn write_detail(&self, key: &str, record: &DetailRecord) -> SinkResult<PathBuf>;

    /// Persists the combined result of a run under `key`
    fn write_run(&self, key: &str, result: &RunResult) -> SinkResult<PathBuf>;
}

/// Writes pretty-printed JSON files
///
/// Layout:
///
/// ```text
/// <data_dir>/<key>.json            combined run results
/// <data_dir>/<books_dir>/<key>.json one file per detailed item
/// ```
///
/// Directories are created on first write, so a run that never persists
/// anything leaves no trace on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    data_dir: PathBuf,
    books_dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(data_dir: impl Into<PathBuf>, books_subdir: &str) -> Self {
        let data_dir = data_dir.into();
        let books_dir = data_dir.join(books_subdir);
        Self {
            data_dir,
            books_dir,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn books_dir(&self) -> &Path {
        &self.books_dir
    }

    fn write_json<T: Serialize>(&self, dir: &Path, key: &str, value: &T) -> SinkResult<PathBuf> {
        if key.is_empty() || key.contains(|c: char| c == '/' || c == '\\') || key.starts_with('.') {
            return Err(SinkError::InvalidKey(key.to_string()));
        }

        std::fs::create_dir_all(dir).map_err(|source| SinkError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(format!("{}.json", key));
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, json).map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

impl RecordSink for JsonFileSink {
    fn write_detail(&self, key: &str, record: &DetailRecord) -> SinkResult<PathBuf> {
        self.write_json(&self.books_dir, key, record)
    }

    fn write_run(&self, key: &str, result: &RunResult) -> SinkResult<PathBuf> {
        self.write_json(&self.data_dir, key, result)
    }
}

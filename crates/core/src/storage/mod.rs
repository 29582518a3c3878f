//! Debug-only persistence of raw payloads.
//!
//! Each successful fetch is written to `<root>/<prefix><timestamp>.json`.
//! Unlike fetch failures, a write failure here is fatal for the run.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Errors that can occur while writing a payload to disk.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to create the target directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the payload file.
    #[error("Failed to write file: {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Writes raw payloads under a root directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `payload` under `prefix` and return the written path.
    ///
    /// A prefix ending in `/` names a directory; otherwise the timestamp is
    /// appended to the file stem.
    pub async fn save(&self, prefix: &str, payload: &Value) -> Result<PathBuf, StorageError> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.9f");
        let path = self.root.join(format!("{}{}.json", prefix, timestamp));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let contents = serde_json::to_vec_pretty(payload)?;
        fs::write(&path, contents)
            .await
            .map_err(|source| StorageError::WriteFailed {
                path: path.clone(),
                source,
            })?;

        debug!("Stored raw payload at {:?}", path);
        Ok(path)
    }
}

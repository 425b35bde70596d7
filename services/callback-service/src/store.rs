//! JSON-file persistence for callback records.
//!
//! The whole document is read and rewritten on every mutation. Appends are
//! serialized through one async mutex so concurrent ingests cannot overwrite
//! each other's inserts. Writes go to a sibling temp file that is renamed over
//! the store, so unlocked reads always see a complete document.

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::{CallbackRecord, StoreDocument};

/// Maximum number of records kept on disk.
pub const MAX_RECORDS: usize = 500;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialize store document: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct CallbackStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CallbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Creates an empty document when the file is missing.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(|source| self.io_error(source))?
        {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }
        self.write(&StoreDocument::default()).await
    }

    /// Loads the document. Unreadable or malformed files read as empty.
    pub async fn read(&self) -> StoreDocument {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "store read failed, using empty document"
                );
                return StoreDocument::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(document) => document,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "store parse failed, using empty document"
                );
                StoreDocument::default()
            }
        }
    }

    /// Replaces the file with the pretty-printed document.
    pub async fn write(&self, document: &StoreDocument) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes)
            .await
            .map_err(|source| self.io_error(source))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|source| self.io_error(source))
    }

    /// Prepends the record and keeps only the newest `MAX_RECORDS`.
    pub async fn append(&self, record: CallbackRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.read().await;
        document.callbacks.insert(0, record);
        if document.callbacks.len() > MAX_RECORDS {
            let evicted = document.callbacks.len() - MAX_RECORDS;
            document.callbacks.truncate(MAX_RECORDS);
            debug!(evicted, "dropped oldest callbacks over capacity");
        }
        self.write(&document).await
    }

    pub async fn list(&self) -> Vec<CallbackRecord> {
        self.read().await.callbacks
    }

    pub async fn find(&self, id: &str) -> Option<CallbackRecord> {
        self.read()
            .await
            .callbacks
            .into_iter()
            .find(|record| record.id == id)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

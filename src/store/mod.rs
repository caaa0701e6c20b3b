//! File-backed record store.
//!
//! Each record is one JSON document at `<base>/<collection>/<id>.json`.
//! Operations complete exactly once with a value or an error; there are no
//! retries or timeouts, and concurrent writes to the same id are
//! last-write-wins.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    AlreadyExists,

    #[error("record not found")]
    NotFound,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable mapping from (collection, id) to a JSON-serializable record.
#[derive(Debug, Clone)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn record_path(&self, collection: &str, id: &str) -> PathBuf {
        self.base.join(collection).join(format!("{}.json", id))
    }

    /// Create a new record. Fails with [`StoreError::AlreadyExists`] if a
    /// record with that id is already present in the collection.
    pub async fn create<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let path = self.record_path(collection, id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // create_new gives the fails-if-exists contract at the filesystem level
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StoreError::AlreadyExists,
                _ => StoreError::Io(e),
            })?;

        let bytes = serde_json::to_vec_pretty(record)?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }

    /// Read and deserialize a record. Fails with [`StoreError::NotFound`] if absent.
    pub async fn read<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<T, StoreError> {
        let path = self.record_path(collection, id);
        let bytes = fs::read(&path).await.map_err(not_found_or_io)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Overwrite an existing record. Fails with [`StoreError::NotFound`] if absent.
    pub async fn update<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let path = self.record_path(collection, id);
        fs::metadata(&path).await.map_err(not_found_or_io)?;

        let bytes = serde_json::to_vec_pretty(record)?;
        fs::write(&path, bytes).await?;
        Ok(())
    }

    /// Delete a record. Fails with [`StoreError::NotFound`] if absent.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let path = self.record_path(collection, id);
        fs::remove_file(&path).await.map_err(not_found_or_io)
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

fn not_found_or_io(e: std::io::Error) -> StoreError {
    match e.kind() {
        ErrorKind::NotFound => StoreError::NotFound,
        _ => StoreError::Io(e),
    }
}

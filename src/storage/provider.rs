use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Size and modification time of a stored blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobMetadata {
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Storage provider trait
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Write data to storage, replacing any existing blob atomically
    async fn put(&self, path: &str, data: Bytes) -> Result<()>;

    /// Move a local file into storage
    /// Default implementation reads the file to memory and calls put
    async fn put_file(&self, path: &str, local_path: &Path) -> Result<()> {
        let data = tokio::fs::read(local_path).await?;
        self.put(path, Bytes::from(data)).await
    }

    /// Read data from storage
    async fn get(&self, path: &str) -> Result<Bytes>;

    /// Delete data from storage. Missing blobs are not an error.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Check if a blob exists
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Size and last-modified time, or `None` if the blob is missing
    async fn metadata(&self, path: &str) -> Result<Option<BlobMetadata>>;

    /// Filesystem path for streaming, if the backend is disk based
    fn local_path(&self, path: &str) -> Option<PathBuf>;

    /// Get the storage type name
    fn storage_type(&self) -> &'static str;
}

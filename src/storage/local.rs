use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::storage::{BlobMetadata, StorageProvider};

/// Local file system storage provider
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Resolve a blob name inside the bucket. Names are flat: any path
    /// separator or parent component is rejected.
    fn get_full_path(&self, path: &str) -> Result<PathBuf> {
        let mut components = Path::new(path).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(self.base_path.join(name)),
            _ => Err(AppError::Storage(format!("Invalid blob name: {}", path))),
        }
    }

    fn temp_path(&self, path: &str) -> PathBuf {
        self.base_path
            .join(format!(".{}.{}.tmp", path, Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn put(&self, path: &str, data: Bytes) -> Result<()> {
        let full_path = self.get_full_path(path)?;
        fs::create_dir_all(&self.base_path).await?;

        // Write to a sibling temp file then rename over the target
        let temp_path = self.temp_path(path);
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &full_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!("Saved file to {:?}", full_path);
        Ok(())
    }

    async fn put_file(&self, path: &str, local_path: &Path) -> Result<()> {
        let full_path = self.get_full_path(path)?;
        fs::create_dir_all(&self.base_path).await?;

        // Rename fails across filesystems; fall back to copy + rename
        if fs::rename(local_path, &full_path).await.is_err() {
            let temp_path = self.temp_path(path);
            fs::copy(local_path, &temp_path).await?;
            if let Err(e) = fs::rename(&temp_path, &full_path).await {
                let _ = fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
        }

        tracing::debug!("Stored {:?} as {:?}", local_path, full_path);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Bytes> {
        let full_path = self.get_full_path(path)?;

        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("File not found: {}", path))
            } else {
                AppError::Storage(format!("Failed to read file: {}", e))
            }
        })?;

        Ok(Bytes::from(data))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.get_full_path(path)?;

        match fs::remove_file(&full_path).await {
            Ok(()) => {
                tracing::debug!("Deleted file {:?}", full_path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.get_full_path(path)?;
        Ok(fs::try_exists(&full_path).await?)
    }

    async fn metadata(&self, path: &str) -> Result<Option<BlobMetadata>> {
        let full_path = self.get_full_path(path)?;

        let meta = match fs::metadata(&full_path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(BlobMetadata {
            size: meta.len(),
            last_modified: DateTime::<Utc>::from(meta.modified()?),
        }))
    }

    fn local_path(&self, path: &str) -> Option<PathBuf> {
        self.get_full_path(path).ok()
    }

    fn storage_type(&self) -> &'static str {
        "local"
    }
}

//! Current-APK version pointer.
//!
//! The pointer is a small JSON record stored next to the blobs it names. A
//! pointer whose blob has disappeared reads as "no current APK".

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::Path;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{ApkInfo, CurrentApkPointer};
use crate::storage::StorageProvider;

pub const POINTER_FILE: &str = "current.json";

/// APK distribution service
pub struct ApkService;

impl ApkService {
    /// Record `filename` as the current APK, replacing any previous pointer
    pub async fn set_current(storage: &dyn StorageProvider, filename: &str) -> Result<()> {
        let pointer = CurrentApkPointer {
            filename: filename.to_string(),
        };
        let data = serde_json::to_vec(&pointer)
            .map_err(|e| AppError::Internal(format!("Failed to encode pointer: {}", e)))?;
        storage.put(POINTER_FILE, Bytes::from(data)).await
    }

    /// The raw pointer record, whether or not its blob still exists
    pub async fn pointer(storage: &dyn StorageProvider) -> Result<Option<String>> {
        let data = match storage.get(POINTER_FILE).await {
            Ok(data) => data,
            Err(AppError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        match serde_json::from_slice::<CurrentApkPointer>(&data) {
            Ok(pointer) if !pointer.filename.is_empty() => Ok(Some(pointer.filename)),
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::warn!("Ignoring unreadable APK pointer: {}", e);
                Ok(None)
            }
        }
    }

    /// The effective current APK: absent if there is no pointer or its blob is gone
    pub async fn get_current(storage: &dyn StorageProvider) -> Result<Option<String>> {
        let Some(filename) = Self::pointer(storage).await? else {
            return Ok(None);
        };

        if storage.exists(&filename).await? {
            Ok(Some(filename))
        } else {
            tracing::warn!("APK pointer names missing blob {}", filename);
            Ok(None)
        }
    }

    pub async fn info(storage: &dyn StorageProvider) -> Result<ApkInfo> {
        let Some(filename) = Self::pointer(storage).await? else {
            return Ok(ApkInfo::default());
        };
        let Some(meta) = storage.metadata(&filename).await? else {
            return Ok(ApkInfo::default());
        };

        Ok(ApkInfo {
            exists: true,
            filename: Some(filename),
            size: Some(meta.size),
            size_human: Some(format_size(meta.size)),
            last_modified: Some(meta.last_modified.timestamp()),
            last_modified_human: Some(format_timestamp(meta.last_modified)),
        })
    }

    /// Store an uploaded file under a fresh versioned name and make it current.
    ///
    /// The new blob is written and the pointer moved before the previous blob
    /// is deleted, so a crash in between leaves an orphan rather than a
    /// dangling pointer.
    pub async fn publish(
        storage: &dyn StorageProvider,
        basename: &str,
        upload: &Path,
    ) -> Result<String> {
        let previous = Self::pointer(storage).await?;
        let filename = versioned_filename(basename, Utc::now());

        storage.put_file(&filename, upload).await?;
        Self::set_current(storage, &filename).await?;
        tracing::info!("Current APK is now {}", filename);

        if let Some(previous) = previous.filter(|p| p != &filename) {
            if let Err(e) = storage.delete(&previous).await {
                tracing::warn!("Failed to delete superseded APK {}: {}", previous, e);
            }
        }

        Ok(filename)
    }
}

/// `<basename>-<yyyymmddHHMMSS>-<8 hex>.apk`
pub fn versioned_filename(basename: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}.apk",
        basename,
        now.format("%Y%m%d%H%M%S"),
        &suffix[..8]
    )
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use chrono::TimeZone;

    #[tokio::test]
    async fn last_set_wins() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.put("a.apk", Bytes::from_static(b"a")).await.unwrap();
        storage.put("b.apk", Bytes::from_static(b"bb")).await.unwrap();

        assert_eq!(ApkService::get_current(&storage).await.unwrap(), None);

        ApkService::set_current(&storage, "a.apk").await.unwrap();
        ApkService::set_current(&storage, "b.apk").await.unwrap();
        assert_eq!(
            ApkService::get_current(&storage).await.unwrap().as_deref(),
            Some("b.apk")
        );
    }

    #[tokio::test]
    async fn removed_blob_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.put("b.apk", Bytes::from_static(b"bb")).await.unwrap();
        ApkService::set_current(&storage, "b.apk").await.unwrap();

        std::fs::remove_file(dir.path().join("b.apk")).unwrap();

        assert_eq!(ApkService::get_current(&storage).await.unwrap(), None);
        assert_eq!(
            ApkService::pointer(&storage).await.unwrap().as_deref(),
            Some("b.apk")
        );
        assert!(!ApkService::info(&storage).await.unwrap().exists);
    }

    #[tokio::test]
    async fn corrupt_pointer_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage
            .put(POINTER_FILE, Bytes::from_static(b"not json"))
            .await
            .unwrap();

        assert_eq!(ApkService::get_current(&storage).await.unwrap(), None);
    }

    #[tokio::test]
    async fn info_reports_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage
            .put("app.apk", Bytes::from(vec![0u8; 2048]))
            .await
            .unwrap();
        ApkService::set_current(&storage, "app.apk").await.unwrap();

        let info = ApkService::info(&storage).await.unwrap();
        assert!(info.exists);
        assert_eq!(info.filename.as_deref(), Some("app.apk"));
        assert_eq!(info.size, Some(2048));
        assert_eq!(info.size_human.as_deref(), Some("2.00 KB"));
        assert!(info.last_modified.unwrap() > 0);
    }

    #[tokio::test]
    async fn publish_replaces_and_removes_previous() {
        let bucket = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(bucket.path());

        let first_upload = scratch.path().join("first");
        std::fs::write(&first_upload, b"v1").unwrap();
        let first = ApkService::publish(&storage, "app", &first_upload)
            .await
            .unwrap();

        let second_upload = scratch.path().join("second");
        std::fs::write(&second_upload, b"v2").unwrap();
        let second = ApkService::publish(&storage, "app", &second_upload)
            .await
            .unwrap();

        assert_ne!(first, second);
        assert!(!storage.exists(&first).await.unwrap());
        assert_eq!(
            ApkService::get_current(&storage).await.unwrap().as_deref(),
            Some(second.as_str())
        );
        assert_eq!(storage.get(&second).await.unwrap(), Bytes::from_static(b"v2"));
    }

    #[test]
    fn versioned_names() {
        let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let name = versioned_filename("revenge-browser", at);
        assert!(name.starts_with("revenge-browser-20260304050607-"));
        assert!(name.ends_with(".apk"));
        assert_eq!(name.len(), "revenge-browser-20260304050607-".len() + 8 + 4);
    }

    #[test]
    fn human_sizes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(200 * 1024 * 1024), "200.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn human_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        assert_eq!(format_timestamp(at), "2026-10-19 08:30:00 UTC");
    }
}

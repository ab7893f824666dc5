use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use std::path::Path;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{ApkInfoResponse, ApkUploadResponse, CurrentAdmin};
use crate::services::ApkService;
use crate::AppState;

const APK_FIELD: &str = "apk";

/// Upload a new APK and make it current
/// POST /api/admin/upload-apk
///
/// The upload is spooled to a `TempPath`, which removes the file when dropped,
/// including when the client goes away mid-request.
pub async fn upload_apk(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    mut multipart: Multipart,
) -> Result<Json<ApkUploadResponse>> {
    let max_bytes = state.config.upload.max_bytes;
    let mut upload: Option<(TempPath, u64)> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| multipart_error(e, max_bytes))? {
        if field.name() != Some(APK_FIELD) || upload.is_some() {
            continue;
        }
        if field.file_name().is_none() {
            return Err(AppError::validation(APK_FIELD, "The apk field must be a file."));
        }

        // Stream to disk so large uploads never sit in memory
        let temp_path = spool_file(&state.config.upload.spool_dir())?;
        let mut file = tokio::fs::File::create(&temp_path).await.map_err(|e| {
            AppError::Internal(format!("Failed to open temp file: {}", e))
        })?;

        let mut size: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, max_bytes))? {
            size += chunk.len() as u64;
            if size > max_bytes {
                return Err(too_large(max_bytes));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        upload = Some((temp_path, size));
    }

    let (temp_path, size) = upload
        .ok_or_else(|| AppError::validation(APK_FIELD, "The apk field is required."))?;

    // Dropping `temp_path` afterwards cleans up whatever `put_file` did not move
    let filename = ApkService::publish(
        state.storage.as_ref(),
        &state.config.app.apk_basename,
        &temp_path,
    )
    .await?;
    tracing::info!(
        "Admin {} uploaded {} ({} bytes)",
        current_admin.id,
        filename,
        size
    );

    Ok(Json(ApkUploadResponse {
        success: true,
        message: "APK uploaded successfully".to_string(),
        filename,
        size,
    }))
}

/// Current APK as seen by the back-office
/// GET /api/admin/apk-info
pub async fn apk_info(State(state): State<AppState>) -> Result<Json<ApkInfoResponse>> {
    let info = ApkService::info(state.storage.as_ref()).await?;
    Ok(Json(ApkInfoResponse {
        success: true,
        info,
    }))
}

fn too_large(max_bytes: u64) -> AppError {
    AppError::validation(
        APK_FIELD,
        format!(
            "The apk field must not be greater than {} kilobytes.",
            max_bytes / 1024
        ),
    )
}

fn multipart_error(e: MultipartError, max_bytes: u64) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_bytes)
    } else {
        AppError::BadRequest(format!("Failed to process multipart: {}", e))
    }
}

fn spool_file(dir: &Path) -> Result<TempPath> {
    let file = tempfile::Builder::new()
        .prefix("revenge_upload_")
        .tempfile_in(dir)
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))?;
    Ok(file.into_temp_path())
}

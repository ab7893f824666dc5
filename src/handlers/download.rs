use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    response::Response,
    Json,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::{AppError, Result};
use crate::middleware::client_ip::ClientIp;
use crate::models::{ApkInfoResponse, StatsResponse};
use crate::services::{ApkService, RateLimitDecision, StatsService};
use crate::AppState;

const APK_MIME: &str = "application/vnd.android.package-archive";

/// Public download counter
/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let download_count = StatsService::download_count(&state.db, &state.config.app.name).await?;
    Ok(Json(StatsResponse {
        success: true,
        download_count,
    }))
}

/// Public view of the current APK
/// GET /api/apk-info
pub async fn apk_info(State(state): State<AppState>) -> Result<Json<ApkInfoResponse>> {
    let info = ApkService::info(state.storage.as_ref()).await?;
    Ok(Json(ApkInfoResponse {
        success: true,
        info,
    }))
}

/// Stream the current APK
/// GET /api/download
///
/// Rate limited per client address. The limiter is consulted before anything
/// else, so rejected attempts never reach the counter.
pub async fn download(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
) -> Result<Response> {
    let key = format!("download-limit:{}", ip);
    if let RateLimitDecision::Limited { retry_after } = state.limiter.hit(&key) {
        tracing::info!("Download rate limit hit for {} ({}s left)", ip, retry_after);
        return Err(AppError::RateLimited { retry_after });
    }

    let filename = ApkService::get_current(state.storage.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("File not found.".to_string()))?;

    let mut response = match state.storage.local_path(&filename) {
        Some(path) => {
            let response = match ServeFile::new(path)
                .oneshot(Request::new(Body::empty()))
                .await
            {
                Ok(response) => response,
                Err(never) => match never {},
            };
            if response.status() != StatusCode::OK {
                // Blob vanished between the pointer check and the open
                return Err(AppError::NotFound("File not found.".to_string()));
            }
            response.map(Body::new)
        }
        None => Response::new(Body::from(state.storage.get(&filename).await?)),
    };

    StatsService::increment(&state.db, &state.config.app.name).await?;

    let download_name = &state.config.app.download_name;
    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        download_name.replace(['"', '\\'], "_"),
        urlencoding::encode(download_name)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| AppError::Internal(format!("Invalid download name: {}", e)))?;

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(APK_MIME));
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok(response)
}

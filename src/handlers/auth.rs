use axum::{extract::State, Extension, Json};

use crate::error::{ApiResponse, Result};
use crate::extract::ApiJson;
use crate::models::{AdminSummary, CurrentAdmin, LoginRequest, LoginResponse};
use crate::services::AuthService;
use crate::AppState;

/// Login admin
/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    let response = AuthService::login(&state.db, req).await?;
    Ok(Json(ApiResponse::success_with_message(
        "Login successful",
        response,
    )))
}

/// Revoke the presented token
/// POST /api/admin/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
) -> Result<Json<ApiResponse<()>>> {
    AuthService::logout(&state.db, current_admin.token_id).await?;
    Ok(Json(ApiResponse::<()>::success_message(
        "Logged out successfully",
    )))
}

/// Current admin
/// GET /api/admin/me
pub async fn me(
    Extension(current_admin): Extension<CurrentAdmin>,
) -> Json<ApiResponse<AdminSummary>> {
    Json(ApiResponse::success(AdminSummary::from(&current_admin)))
}

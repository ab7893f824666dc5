use axum::{extract::State, Extension, Json};

use crate::error::{ApiResponse, Result};
use crate::models::{CurrentAdmin, DashboardStats, WithdrawalsResponse};
use crate::policy;
use crate::services::StatsService;
use crate::AppState;

/// Dashboard figures
/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStats>>> {
    let stats = StatsService::dashboard(&state.db, &state.config.app.name).await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// Withdrawal queue (placeholder, always empty)
/// GET /api/admin/withdrawals
pub async fn withdrawals(
    Extension(current_admin): Extension<CurrentAdmin>,
) -> Json<ApiResponse<WithdrawalsResponse>> {
    Json(ApiResponse::success(WithdrawalsResponse {
        withdrawals: Vec::new(),
        can_approve: policy::can_approve_withdrawals(current_admin.role),
    }))
}

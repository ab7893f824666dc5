use axum::{extract::State, Extension, Json};

use crate::error::{ApiResponse, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::models::{CurrentAdmin, UpdateUserRequest, User, UserUpdatedResponse};
use crate::services::UserService;
use crate::AppState;

/// List users
/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<User>>>> {
    let users = UserService::list_users(&state.db).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// Rename a user
/// PUT /api/admin/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserUpdatedResponse>> {
    let user = UserService::update_name(&state.db, id, &req.name).await?;
    tracing::info!("Admin {} renamed user {}", current_admin.id, user.id);

    Ok(Json(UserUpdatedResponse {
        success: true,
        message: "User updated successfully".to_string(),
        user,
    }))
}

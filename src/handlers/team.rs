use axum::{extract::State, Extension, Json};

use crate::error::{ApiResponse, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::models::{
    AdminUserResponse, CreateTeamMemberRequest, CurrentAdmin, TeamMemberCreatedResponse,
};
use crate::services::TeamService;
use crate::AppState;

/// List team members
/// GET /api/admin/team
pub async fn list_team(State(state): State<AppState>) -> Result<Json<Vec<AdminUserResponse>>> {
    let team = TeamService::list(&state.db).await?;
    Ok(Json(team))
}

/// Create a team member
/// POST /api/admin/team
pub async fn create_team_member(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    ApiJson(req): ApiJson<CreateTeamMemberRequest>,
) -> Result<Json<TeamMemberCreatedResponse>> {
    let user = TeamService::create(&state.db, &current_admin, req).await?;
    Ok(Json(TeamMemberCreatedResponse {
        success: true,
        message: "Team member created successfully.".to_string(),
        user,
    }))
}

/// Remove a team member
/// DELETE /api/admin/team/:id
pub async fn delete_team_member(
    State(state): State<AppState>,
    Extension(current_admin): Extension<CurrentAdmin>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<()>>> {
    TeamService::delete(&state.db, &current_admin, id).await?;
    Ok(Json(ApiResponse::<()>::success_message("Team member removed.")))
}

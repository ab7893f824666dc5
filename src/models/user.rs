use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Regular (app) user record
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Update user request
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct UserUpdatedResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
}

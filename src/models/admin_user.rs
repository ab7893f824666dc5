use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::policy::{Member, Role};

/// Back-office team member
#[derive(Debug, Clone, FromRow)]
pub struct AdminUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl AdminUser {
    pub fn get_role(&self) -> Role {
        Role::from_stored(&self.role)
    }

    pub fn as_member(&self) -> Member {
        Member {
            id: self.id,
            role: self.get_role(),
        }
    }
}

/// Team member as listed in the back-office (password hash omitted)
#[derive(Debug, Clone, Serialize)]
pub struct AdminUserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AdminUser> for AdminUserResponse {
    fn from(user: AdminUser) -> Self {
        Self {
            role: user.get_role(),
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Identity payload returned by login and `/me`
#[derive(Debug, Clone, Serialize)]
pub struct AdminSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&CurrentAdmin> for AdminSummary {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            id: admin.id,
            name: admin.name.clone(),
            email: admin.email.clone(),
            role: admin.role,
        }
    }
}

impl From<AdminUser> for AdminSummary {
    fn from(user: AdminUser) -> Self {
        Self {
            role: user.get_role(),
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminSummary,
}

/// Create team member request
#[derive(Debug, Deserialize)]
pub struct CreateTeamMemberRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct TeamMemberCreatedResponse {
    pub success: bool,
    pub message: String,
    pub user: AdminUserResponse,
}

/// Authenticated admin (resolved from the bearer token)
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Row id of the token used for this request
    pub token_id: i64,
}

impl CurrentAdmin {
    pub fn as_member(&self) -> Member {
        Member {
            id: self.id,
            role: self.role,
        }
    }
}

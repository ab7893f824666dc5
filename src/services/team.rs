use chrono::Utc;

use crate::config::AdminSeedConfig;
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{AdminUser, AdminUserResponse, CreateTeamMemberRequest, CurrentAdmin};
use crate::policy::{self, Role};
use crate::services::AuthService;
use crate::validation;

const MIN_PASSWORD_CHARS: usize = 8;

/// Back-office team management
pub struct TeamService;

impl TeamService {
    /// List team members, most privileged first, newest first within a role
    pub async fn list(db: &Database) -> Result<Vec<AdminUserResponse>> {
        let members: Vec<AdminUser> = sqlx::query_as(
            r#"
            SELECT * FROM admin_users
            ORDER BY CASE role
                WHEN 'admin' THEN 0
                WHEN 'lead_moderator' THEN 1
                ELSE 2
            END, created_at DESC, id DESC
            "#,
        )
        .fetch_all(db.pool())
        .await?;

        Ok(members.into_iter().map(AdminUserResponse::from).collect())
    }

    /// Create a team member on behalf of `creator`.
    /// The request is validated first, then checked against the role policy.
    pub async fn create(
        db: &Database,
        creator: &CurrentAdmin,
        req: CreateTeamMemberRequest,
    ) -> Result<AdminUserResponse> {
        let name = validation::required("name", &req.name)?;
        validation::max_chars("name", name, 255)?;

        let email = validation::required("email", &req.email)?;
        validation::email("email", email)?;
        validation::max_chars("email", email, 255)?;
        if Self::email_taken(db, email).await? {
            return Err(AppError::validation("email", "The email has already been taken."));
        }

        validation::required("password", &req.password)?;
        validation::min_chars("password", &req.password, MIN_PASSWORD_CHARS)?;

        let role: Role = validation::required("role", &req.role)?
            .parse()
            .map_err(|_| AppError::validation("role", "The selected role is invalid."))?;

        if let Err(e) = policy::can_create(creator.role, role).into_result() {
            tracing::warn!(
                "Admin {} ({}) denied creating a {}",
                creator.id,
                creator.role,
                role
            );
            return Err(e);
        }

        let member = Self::insert(db, name, email, &req.password, role).await?;
        tracing::info!(
            "Admin {} created team member {} as {}",
            creator.id,
            member.id,
            role
        );
        Ok(member)
    }

    /// Insert a team member without any policy check
    pub async fn insert(
        db: &Database,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<AdminUserResponse> {
        let password_hash = AuthService::hash_password(password)?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO admin_users (name, email, password, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(&now)
        .bind(&now)
        .execute(db.pool())
        .await;

        let id = match result {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(AppError::validation("email", "The email has already been taken."));
            }
            Err(e) => return Err(e.into()),
        };

        let member = Self::get(db, id).await?;
        Ok(AdminUserResponse::from(member))
    }

    /// Remove a team member on behalf of `deleter`
    pub async fn delete(db: &Database, deleter: &CurrentAdmin, target_id: i64) -> Result<()> {
        let target = Self::get(db, target_id).await?;

        if let Err(e) = policy::can_delete(deleter.as_member(), target.as_member()).into_result() {
            tracing::warn!(
                "Admin {} ({}) denied deleting team member {} ({})",
                deleter.id,
                deleter.role,
                target.id,
                target.role
            );
            return Err(e);
        }

        sqlx::query("DELETE FROM admin_users WHERE id = ?")
            .bind(target.id)
            .execute(db.pool())
            .await?;

        tracing::info!("Admin {} removed team member {}", deleter.id, target.id);
        Ok(())
    }

    /// Create the bootstrap admin from configuration when no team exists yet
    pub async fn seed_initial_admin(db: &Database, seed: &AdminSeedConfig) -> Result<()> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_users")
            .fetch_one(db.pool())
            .await?;
        if count.0 > 0 {
            return Ok(());
        }

        match (&seed.email, &seed.password) {
            (Some(email), Some(password)) => {
                let name = seed.name.as_deref().unwrap_or("Admin");
                let admin = Self::insert(db, name, email, password, Role::Admin).await?;
                tracing::info!("Seeded initial admin {} <{}>", admin.id, admin.email);
            }
            _ => {
                tracing::warn!(
                    "No admin users exist; set RW_CONF_ADMIN_EMAIL and RW_CONF_ADMIN_PASSWORD to create one"
                );
            }
        }
        Ok(())
    }

    async fn get(db: &Database, id: i64) -> Result<AdminUser> {
        sqlx::query_as("SELECT * FROM admin_users WHERE id = ?")
            .bind(id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("Team member not found.".to_string()))
    }

    async fn email_taken(db: &Database, email: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_users WHERE email = ?")
            .bind(email)
            .fetch_one(db.pool())
            .await?;
        Ok(count.0 > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("team.db").to_str().unwrap())
            .await
            .unwrap();
        db.run_migrations("test_app").await.unwrap();
        (dir, db)
    }

    async fn member(db: &Database, email: &str, role: Role) -> CurrentAdmin {
        let created = TeamService::insert(db, "Member", email, "password123", role)
            .await
            .unwrap();
        CurrentAdmin {
            id: created.id,
            name: created.name,
            email: created.email,
            role,
            token_id: 0,
        }
    }

    fn request(email: &str, role: &str) -> CreateTeamMemberRequest {
        CreateTeamMemberRequest {
            name: "New Member".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            role: role.to_string(),
        }
    }

    #[tokio::test]
    async fn lead_moderator_creates_only_moderators() {
        let (_dir, db) = setup().await;
        let lead = member(&db, "lead@example.com", Role::LeadModerator).await;

        let err = TeamService::create(&db, &lead, request("x@example.com", "admin"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::Forbidden(msg) if msg == "Lead Moderators can only create Moderators.")
        );

        let created = TeamService::create(&db, &lead, request("m@example.com", "moderator"))
            .await
            .unwrap();
        assert_eq!(created.role, Role::Moderator);
    }

    #[tokio::test]
    async fn validation_runs_before_policy() {
        let (_dir, db) = setup().await;
        let moderator = member(&db, "mod@example.com", Role::Moderator).await;

        let err = TeamService::create(&db, &moderator, request("mod@example.com", "moderator"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "email"));

        let err = TeamService::create(&db, &moderator, request("fresh@example.com", "owner"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "role"));

        let mut short = request("fresh@example.com", "moderator");
        short.password = "short".to_string();
        let err = TeamService::create(&db, &moderator, short).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "password"));

        let err = TeamService::create(&db, &moderator, request("fresh@example.com", "moderator"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(msg) if msg == "Moderators cannot create users."));
    }

    #[tokio::test]
    async fn delete_applies_policy() {
        let (_dir, db) = setup().await;
        let admin = member(&db, "admin@example.com", Role::Admin).await;
        let lead = member(&db, "lead@example.com", Role::LeadModerator).await;
        let other_lead = member(&db, "lead2@example.com", Role::LeadModerator).await;
        let moderator = member(&db, "mod@example.com", Role::Moderator).await;

        assert!(TeamService::delete(&db, &admin, admin.id).await.is_err());
        assert!(TeamService::delete(&db, &lead, other_lead.id).await.is_err());
        assert!(TeamService::delete(&db, &moderator, lead.id).await.is_err());

        TeamService::delete(&db, &lead, moderator.id).await.unwrap();
        TeamService::delete(&db, &admin, other_lead.id).await.unwrap();

        let err = TeamService::delete(&db, &admin, moderator.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let remaining: Vec<i64> = TeamService::list(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(remaining, vec![admin.id, lead.id]);
    }

    #[tokio::test]
    async fn seed_only_when_team_is_empty() {
        let (_dir, db) = setup().await;
        let seed = AdminSeedConfig {
            name: None,
            email: Some("root@example.com".to_string()),
            password: Some("password123".to_string()),
        };

        TeamService::seed_initial_admin(&db, &seed).await.unwrap();
        TeamService::seed_initial_admin(&db, &seed).await.unwrap();

        let team = TeamService::list(&db).await.unwrap();
        assert_eq!(team.len(), 1);
        assert_eq!(team[0].role, Role::Admin);
        assert_eq!(team[0].name, "Admin");
    }
}

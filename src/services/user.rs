use chrono::Utc;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::validation;

/// Regular user service
pub struct UserService;

impl UserService {
    /// Get user by ID
    pub async fn get_user(db: &Database, user_id: i64) -> Result<User> {
        let user: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        Ok(user)
    }

    /// List all users, newest first
    pub async fn list_users(db: &Database) -> Result<Vec<User>> {
        let users: Vec<User> =
            sqlx::query_as("SELECT * FROM users ORDER BY created_at DESC, id DESC")
                .fetch_all(db.pool())
                .await?;

        Ok(users)
    }

    pub async fn count_users(db: &Database) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await?;
        Ok(count.0)
    }

    /// Change a user's display name
    pub async fn update_name(db: &Database, user_id: i64, name: &str) -> Result<User> {
        // Missing users are reported before validation
        Self::get_user(db, user_id).await?;

        let name = validation::required("name", name)?;
        validation::max_chars("name", name, 255)?;

        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE users SET name = ?, updated_at = ? WHERE id = ?")
            .bind(name)
            .bind(&now)
            .bind(user_id)
            .execute(db.pool())
            .await?;

        Self::get_user(db, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("users.db").to_str().unwrap())
            .await
            .unwrap();
        db.run_migrations("test_app").await.unwrap();
        sqlx::query("INSERT INTO users (name, email, created_at) VALUES (?, ?, ?), (?, ?, ?)")
            .bind("Old")
            .bind("old@example.com")
            .bind("2025-01-01T00:00:00+00:00")
            .bind("New")
            .bind("new@example.com")
            .bind("2026-01-01T00:00:00+00:00")
            .execute(db.pool())
            .await
            .unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let (_dir, db) = setup().await;
        let names: Vec<String> = UserService::list_users(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["New", "Old"]);
        assert_eq!(UserService::count_users(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_name_only_touches_name() {
        let (_dir, db) = setup().await;
        let before = UserService::get_user(&db, 1).await.unwrap();

        let after = UserService::update_name(&db, 1, "  Renamed ").await.unwrap();
        assert_eq!(after.name, "Renamed");
        assert_eq!(after.email, before.email);
        assert_eq!(after.created_at, before.created_at);
    }

    #[tokio::test]
    async fn update_name_errors() {
        let (_dir, db) = setup().await;

        let err = UserService::update_name(&db, 99, "x").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = UserService::update_name(&db, 1, "").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "name"));

        let err = UserService::update_name(&db, 1, &"a".repeat(256)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "name"));
    }
}

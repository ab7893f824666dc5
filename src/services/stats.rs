use chrono::Utc;

use crate::db::Database;
use crate::error::Result;
use crate::models::DashboardStats;
use crate::services::UserService;

/// Download counter
pub struct StatsService;

impl StatsService {
    /// Add one download. A single upsert statement, so concurrent callers
    /// are serialized by the database and no increment is lost.
    pub async fn increment(db: &Database, app_name: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO app_stats (app_name, download_count, created_at, updated_at)
            VALUES (?, 1, ?, ?)
            ON CONFLICT(app_name) DO UPDATE
            SET download_count = download_count + 1, updated_at = excluded.updated_at
            "#,
        )
        .bind(app_name)
        .bind(&now)
        .bind(&now)
        .execute(db.pool())
        .await?;

        Ok(())
    }

    /// Current count, zero when the row does not exist yet
    pub async fn download_count(db: &Database, app_name: &str) -> Result<i64> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT download_count FROM app_stats WHERE app_name = ?")
                .bind(app_name)
                .fetch_optional(db.pool())
                .await?;

        Ok(count.unwrap_or(0))
    }

    pub async fn dashboard(db: &Database, app_name: &str) -> Result<DashboardStats> {
        Ok(DashboardStats {
            total_users: UserService::count_users(db).await?,
            total_earned: 0.0,
            pending_withdrawals: 0,
            pending_amount: 0.0,
            total_downloads: Self::download_count(db, app_name).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("stats.db").to_str().unwrap())
            .await
            .unwrap();
        db.run_migrations("seeded").await.unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn missing_row_reads_zero_and_is_created_on_increment() {
        let (_dir, db) = setup().await;

        assert_eq!(StatsService::download_count(&db, "other").await.unwrap(), 0);
        StatsService::increment(&db, "other").await.unwrap();
        StatsService::increment(&db, "other").await.unwrap();
        assert_eq!(StatsService::download_count(&db, "other").await.unwrap(), 2);
        assert_eq!(StatsService::download_count(&db, "seeded").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let (_dir, db) = setup().await;
        StatsService::increment(&db, "seeded").await.unwrap();
        let initial = StatsService::download_count(&db, "seeded").await.unwrap();

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move { StatsService::increment(&db, "seeded").await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(
            StatsService::download_count(&db, "seeded").await.unwrap(),
            initial + 50
        );
    }

    #[tokio::test]
    async fn dashboard_reports_downloads() {
        let (_dir, db) = setup().await;
        StatsService::increment(&db, "seeded").await.unwrap();

        let stats = StatsService::dashboard(&db, "seeded").await.unwrap();
        assert_eq!(stats.total_downloads, 1);
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.pending_withdrawals, 0);
    }
}

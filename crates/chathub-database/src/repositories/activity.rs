//! Last-activity repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use chathub_core::error::{AppError, ErrorKind};
use chathub_core::result::AppResult;
use chathub_core::traits::ActivityStore;
use chathub_core::types::UserId;
use chathub_entity::activity::OnlineUser;

/// Repository for the `online_users` activity markers.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    /// Create a new activity repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert a user's marker to the given instant.
    pub async fn touch(&self, user_id: UserId, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO online_users (user_id, last_activity) VALUES (?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET last_activity = excluded.last_activity",
        )
        .bind(user_id.as_i64())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update last activity", e)
        })?;
        Ok(())
    }

    /// Find a user's marker.
    pub async fn find(&self, user_id: UserId) -> AppResult<Option<OnlineUser>> {
        sqlx::query_as::<_, OnlineUser>(
            "SELECT user_id, last_activity FROM online_users WHERE user_id = ?",
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find activity", e))
    }

    /// Delete every marker older than `cutoff`. Returns the number removed.
    pub async fn delete_inactive_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM online_users WHERE last_activity < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clean up inactive users", e)
            })?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ActivityStore for ActivityRepository {
    async fn update_last_activity(&self, user_id: UserId) -> AppResult<()> {
        self.touch(user_id, Utc::now()).await
    }
}

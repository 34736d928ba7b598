//! Inactivity sweep over the `online_users` activity markers.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use chathub_core::result::AppResult;
use chathub_database::repositories::ActivityRepository;

/// Deletes activity markers that have not been refreshed recently.
#[derive(Debug, Clone)]
pub struct InactivityCleanupJob {
    /// Activity repository
    activity: ActivityRepository,
    /// Markers older than this are removed
    max_inactivity: Duration,
}

impl InactivityCleanupJob {
    /// Create a new cleanup job
    pub fn new(activity: ActivityRepository, inactivity_minutes: i64) -> Self {
        Self {
            activity,
            max_inactivity: Duration::minutes(inactivity_minutes.max(1)),
        }
    }

    /// Run one sweep relative to the current time.
    pub async fn run(&self) -> AppResult<u64> {
        self.run_at(Utc::now()).await
    }

    /// Run one sweep relative to `now`. Returns the number of markers removed.
    pub async fn run_at(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let cutoff = now - self.max_inactivity;
        let removed = self.activity.delete_inactive_before(cutoff).await?;
        info!(removed, cutoff = %cutoff, "Inactive users cleaned up");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use chathub_core::config::DatabaseConfig;
    use chathub_core::types::UserId;
    use chathub_database::DatabasePool;
    use chathub_database::migration::run_migrations;
    use chathub_database::repositories::UserRepository;

    use super::*;

    #[tokio::test]
    async fn test_sweep_removes_only_stale_markers() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..DatabaseConfig::default()
        };
        let db = DatabasePool::connect(&config).await.unwrap();
        run_migrations(db.pool()).await.unwrap();

        let users = UserRepository::new(db.pool().clone());
        let stale = UserId(users.create("stale").await.unwrap().user_id);
        let fresh = UserId(users.create("fresh").await.unwrap().user_id);
        let activity = ActivityRepository::new(db.pool().clone());

        let now = Utc::now();
        activity.touch(stale, now - Duration::minutes(31)).await.unwrap();
        activity.touch(fresh, now - Duration::minutes(29)).await.unwrap();

        let job = InactivityCleanupJob::new(activity.clone(), 30);
        assert_eq!(job.run_at(now).await.unwrap(), 1);
        assert!(activity.find(stale).await.unwrap().is_none());
        assert!(activity.find(fresh).await.unwrap().is_some());

        assert_eq!(job.run_at(now).await.unwrap(), 0);
    }
}

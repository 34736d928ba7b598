//! User repository implementation.

use async_trait::async_trait;
use sqlx::SqlitePool;

use chathub_core::error::{AppError, ErrorKind};
use chathub_core::result::AppResult;
use chathub_core::traits::UserDirectory;
use chathub_core::types::UserId;
use chathub_entity::user::User;

/// Repository for user lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT user_id, username FROM users WHERE user_id = ?")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Insert a user with an empty password and return it.
    ///
    /// Registration proper happens outside the hub; this exists for seeding.
    pub async fn create(&self, username: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username) VALUES (?) RETURNING user_id, username",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create user", e))
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn get_username_by_id(&self, user_id: UserId) -> AppResult<String> {
        self.find_by_id(user_id)
            .await?
            .map(|u| u.username)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_pool;

    #[tokio::test]
    async fn test_username_lookup() {
        let db = memory_pool().await;
        let repo = UserRepository::new(db.pool().clone());
        let alice = repo.create("alice").await.unwrap();

        let name = repo
            .get_username_by_id(UserId(alice.user_id))
            .await
            .unwrap();
        assert_eq!(name, "alice");
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let db = memory_pool().await;
        let repo = UserRepository::new(db.pool().clone());
        let err = repo.get_username_by_id(UserId(99)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}

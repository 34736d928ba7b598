//! # chathub-database
//!
//! SQLite connection management and concrete repository implementations.
//! The repositories implement the collaborator traits from
//! `chathub_core::traits` so the realtime engine can use them directly.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{ActivityRepository, ChatRepository, UserRepository};

#[cfg(test)]
pub(crate) mod test_support {
    use chathub_core::config::DatabaseConfig;

    use crate::connection::DatabasePool;
    use crate::migration::run_migrations;

    /// A migrated in-memory database on a single connection.
    pub async fn memory_pool() -> DatabasePool {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..DatabaseConfig::default()
        };
        let pool = DatabasePool::connect(&config).await.unwrap();
        run_migrations(pool.pool()).await.unwrap();
        pool
    }
}

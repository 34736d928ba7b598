//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use chathub_core::config::AppConfig;
use chathub_database::DatabasePool;
use chathub_database::repositories::ChatRepository;
use chathub_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// SQLite connection pool
    pub db: DatabasePool,
    /// Chat history reads
    pub chat_repo: Arc<ChatRepository>,
    /// WebSocket realtime engine
    pub realtime: RealtimeEngine,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Assemble the state from its parts.
    pub fn new(config: AppConfig, db: DatabasePool, realtime: RealtimeEngine) -> Self {
        let chat_repo = Arc::new(ChatRepository::new(db.pool().clone()));
        Self {
            config: Arc::new(config),
            db,
            chat_repo,
            realtime,
            started_at: Instant::now(),
        }
    }
}

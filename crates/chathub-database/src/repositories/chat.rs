//! Chat message repository implementation.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use chathub_core::error::{AppError, ErrorKind};
use chathub_core::result::AppResult;
use chathub_core::traits::ChatStore;
use chathub_core::types::UserId;
use chathub_entity::chat::ChatRecord;

/// Repository for persisted private messages.
#[derive(Debug, Clone)]
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    /// Create a new chat repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a message and return its id.
    pub async fn insert(&self, chat: &ChatRecord) -> AppResult<i64> {
        let result = sqlx::query(
            "INSERT INTO chats (sender_id, receiver_id, message, sent_at, sender_username) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(chat.sender_id)
        .bind(chat.receiver_id)
        .bind(&chat.message)
        .bind(chat.sent_at)
        .bind(&chat.sender_username)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save chat message", e))?;

        Ok(result.last_insert_rowid())
    }

    /// Both directions of the conversation between two users, oldest first.
    pub async fn history(&self, a: UserId, b: UserId) -> AppResult<Vec<ChatRecord>> {
        sqlx::query_as::<_, ChatRecord>(
            "SELECT message_id, sender_id, receiver_id, message, sent_at, sender_username \
             FROM chats \
             WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?) \
             ORDER BY sent_at ASC, message_id ASC",
        )
        .bind(a.as_i64())
        .bind(b.as_i64())
        .bind(b.as_i64())
        .bind(a.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch chat history", e))
    }
}

#[async_trait]
impl ChatStore for ChatRepository {
    async fn save_chat_message(&self, chat: &ChatRecord) -> AppResult<()> {
        let id = self.insert(chat).await?;
        debug!(
            message_id = id,
            sender_id = chat.sender_id,
            receiver_id = chat.receiver_id,
            "Chat message saved"
        );
        Ok(())
    }
}

//! Persistence collaborators for chat delivery and presence reports.

use async_trait::async_trait;

use chathub_entity::chat::ChatRecord;

use crate::result::AppResult;
use crate::types::UserId;

/// Resolves display names for user ids.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Look up the username of a user.
    async fn get_username_by_id(&self, user_id: UserId) -> AppResult<String>;
}

/// Stores delivered private messages.
#[async_trait]
pub trait ChatStore: Send + Sync + 'static {
    /// Persist one private message. Called once per delivered message.
    async fn save_chat_message(&self, chat: &ChatRecord) -> AppResult<()>;
}

/// Records when a user last did something.
#[async_trait]
pub trait ActivityStore: Send + Sync + 'static {
    /// Upsert the user's last-activity marker to "now".
    async fn update_last_activity(&self, user_id: UserId) -> AppResult<()>;
}

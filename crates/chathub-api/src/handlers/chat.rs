//! Chat history handler.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use chathub_core::error::AppError;
use chathub_core::types::UserId;
use chathub_entity::chat::ChatRecord;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for `GET /chat-history`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    /// One side of the conversation.
    pub sender_id: Option<String>,
    /// The other side.
    pub receiver_id: Option<String>,
}

/// GET /chat-history?senderId={id}&receiverId={id}
///
/// Returns every message exchanged between the two users, in both
/// directions, oldest first.
pub async fn chat_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatRecord>>, ApiError> {
    let sender = parse_user_id(query.sender_id.as_deref(), "Invalid sender ID")?;
    let receiver = parse_user_id(query.receiver_id.as_deref(), "Invalid receiver ID")?;

    let chats = state.chat_repo.history(sender, receiver).await?;
    Ok(Json(chats))
}

fn parse_user_id(raw: Option<&str>, message: &str) -> Result<UserId, AppError> {
    raw.and_then(|s| s.trim().parse::<UserId>().ok())
        .ok_or_else(|| AppError::validation(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id(Some("42"), "bad").unwrap(), UserId(42));
        assert!(parse_user_id(Some("abc"), "bad").is_err());
        assert!(parse_user_id(Some(""), "bad").is_err());
        assert_eq!(parse_user_id(None, "bad").unwrap_err().message, "bad");
    }
}

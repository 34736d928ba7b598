//! Persisted private message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One delivered private message, as stored in the `chats` table.
///
/// Created exactly once per private send and never updated. Field names
/// on the wire follow the chat-history API the forum frontend reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChatRecord {
    /// Database id, absent until the row is inserted.
    #[serde(default)]
    pub message_id: Option<i64>,
    /// Authenticated sender.
    pub sender_id: i64,
    /// Addressed recipient.
    pub receiver_id: i64,
    /// Message body.
    #[serde(rename = "message_content")]
    #[sqlx(rename = "message")]
    pub message: String,
    /// Server timestamp stamped at delivery.
    pub sent_at: DateTime<Utc>,
    /// Sender's username at send time.
    #[serde(rename = "senderUsername")]
    pub sender_username: String,
}

impl ChatRecord {
    /// Build a new, not yet persisted record.
    pub fn new(
        sender_id: i64,
        receiver_id: i64,
        message: impl Into<String>,
        sent_at: DateTime<Utc>,
        sender_username: impl Into<String>,
    ) -> Self {
        Self {
            message_id: None,
            sender_id,
            receiver_id,
            message: message.into(),
            sent_at,
            sender_username: sender_username.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_field_names() {
        let sent_at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let chat = ChatRecord::new(1, 2, "hey", sent_at, "alice");
        let json = serde_json::to_value(&chat).unwrap();
        assert_eq!(json["message_content"], "hey");
        assert_eq!(json["senderUsername"], "alice");
        assert_eq!(json["sender_id"], 1);
        assert_eq!(json["receiver_id"], 2);
    }
}

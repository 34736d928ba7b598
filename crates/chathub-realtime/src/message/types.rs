//! Wire message definitions shared by both directions of the socket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chathub_core::types::UserId;

/// `type` value of a private message.
pub const TYPE_PRIVATE: &str = "private";
/// `type` value of a broadcast message.
pub const TYPE_BROADCAST: &str = "broadcast";
/// `type` value of a presence report request and its reply.
pub const TYPE_ONLINE_USERS: &str = "onlineUsers";
/// `type` value of a presence transition notice.
pub const TYPE_USER_STATUS_CHANGE: &str = "userStatusChange";

/// The message envelope exchanged in both directions.
///
/// Zero ids, empty strings, an absent timestamp and an empty user list are
/// left out of the encoded form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message type.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Sending user; overwritten by the server.
    #[serde(default, skip_serializing_if = "UserId::is_zero")]
    pub sender_id: UserId,
    /// Sending user's name; filled in by the server on chat messages.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sender_username: String,
    /// Recipient of a private message.
    #[serde(default, skip_serializing_if = "UserId::is_zero")]
    pub receiver_id: UserId,
    /// Message body.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Server timestamp on delivered chat messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    /// Presence entries; only set on presence messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub online_users: Vec<UserStatus>,
}

impl Message {
    /// The routing class of this message.
    pub fn kind(&self) -> MessageKind {
        MessageKind::parse(&self.kind)
    }
}

/// One user's presence as reported to clients. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    /// User ID.
    pub user_id: UserId,
    /// Username; empty when it could not be resolved.
    #[serde(default)]
    pub username: String,
    /// Whether the user has at least one live connection.
    pub is_online: bool,
}

/// Error reply sent only to the connection that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Human-readable reason.
    pub error: String,
}

/// Routing class of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Delivered to every connection of one recipient and persisted.
    Private,
    /// Delivered to every connection of every other user.
    Broadcast,
    /// Presence snapshot request.
    OnlineUsers,
    /// Anything the hub does not route.
    Unknown(String),
}

impl MessageKind {
    /// Classify a `type` value, ignoring case.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case(TYPE_PRIVATE) {
            Self::Private
        } else if raw.eq_ignore_ascii_case(TYPE_BROADCAST) {
            Self::Broadcast
        } else if raw.eq_ignore_ascii_case(TYPE_ONLINE_USERS) {
            Self::OnlineUsers
        } else {
            Self::Unknown(raw.to_string())
        }
    }

    /// Canonical `type` string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Private => TYPE_PRIVATE,
            Self::Broadcast => TYPE_BROADCAST,
            Self::OnlineUsers => TYPE_ONLINE_USERS,
            Self::Unknown(raw) => raw,
        }
    }
}

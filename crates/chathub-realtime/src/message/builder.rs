//! Builder helpers for constructing server-originated messages.

use super::types::{ErrorReply, Message, TYPE_ONLINE_USERS, TYPE_USER_STATUS_CHANGE, UserStatus};

/// Build an error reply.
pub fn build_error(reason: impl Into<String>) -> ErrorReply {
    ErrorReply {
        error: reason.into(),
    }
}

/// Build a presence report for the requesting connection.
pub fn build_online_users(online_users: Vec<UserStatus>) -> Message {
    Message {
        kind: TYPE_ONLINE_USERS.to_string(),
        online_users,
        ..Message::default()
    }
}

/// Build a presence transition notice carrying exactly one status.
pub fn build_status_change(status: UserStatus) -> Message {
    Message {
        kind: TYPE_USER_STATUS_CHANGE.to_string(),
        online_users: vec![status],
        ..Message::default()
    }
}

//! User entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered forum user, as far as the chat hub needs to know it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Primary key.
    pub user_id: i64,
    /// Unique login name, shown to other users.
    pub username: String,
}

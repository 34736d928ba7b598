//! Row of the `online_users` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Last time a user did something that counts as activity.
///
/// Refreshed on private sends and swept by the inactivity cleanup job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OnlineUser {
    /// User the marker belongs to.
    pub user_id: i64,
    /// Last recorded activity.
    pub last_activity: DateTime<Utc>,
}

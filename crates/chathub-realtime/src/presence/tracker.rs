//! Presence tracker: counted online/offline state per user.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use chathub_core::traits::UserDirectory;
use chathub_core::types::UserId;

use crate::message::types::UserStatus;

/// Tracks which users are online.
///
/// A user is online while they own at least one registered connection.
/// Each user carries a live-connection count; only the 0→1 and 1→0 edges
/// are reported as transitions.
pub struct PresenceTracker {
    /// User ID → live connection count (never zero)
    counts: Mutex<BTreeMap<UserId, usize>>,
    /// Username lookup for reports
    directory: Arc<dyn UserDirectory>,
}

impl std::fmt::Debug for PresenceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceTracker")
            .field("online", &self.online_count())
            .finish()
    }
}

impl PresenceTracker {
    /// Create a new presence tracker
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            counts: Mutex::new(BTreeMap::new()),
            directory,
        }
    }

    /// Count one more connection for a user.
    ///
    /// Returns `true` when this made the user online.
    pub fn mark_online(&self, user_id: UserId) -> bool {
        let mut counts = self.counts.lock();
        let count = counts.entry(user_id).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Count one connection fewer for a user.
    ///
    /// Returns `true` when this made the user offline. A user with no
    /// connections is left alone.
    pub fn mark_offline(&self, user_id: UserId) -> bool {
        let mut counts = self.counts.lock();
        match counts.get_mut(&user_id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                counts.remove(&user_id);
                true
            }
            None => false,
        }
    }

    /// Check if a user is online
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.counts.lock().contains_key(&user_id)
    }

    /// Get online user count
    pub fn online_count(&self) -> usize {
        self.counts.lock().len()
    }

    /// Online user IDs in ascending order.
    pub fn online_user_ids(&self) -> Vec<UserId> {
        self.counts.lock().keys().copied().collect()
    }

    /// Statuses of every online user, ordered by user ID.
    ///
    /// Users whose name cannot be resolved are logged and left out.
    pub async fn snapshot(&self) -> Vec<UserStatus> {
        let ids = self.online_user_ids();
        let mut statuses = Vec::with_capacity(ids.len());
        for user_id in ids {
            match self.directory.get_username_by_id(user_id).await {
                Ok(username) => statuses.push(UserStatus {
                    user_id,
                    username,
                    is_online: true,
                }),
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Username lookup failed, omitting from presence report");
                }
            }
        }
        statuses
    }

    /// Status entry for a transition notice.
    ///
    /// A failed lookup still yields a status, with an empty username.
    pub async fn status_of(&self, user_id: UserId, is_online: bool) -> UserStatus {
        let username = match self.directory.get_username_by_id(user_id).await {
            Ok(name) => name,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Username lookup failed for status change");
                String::new()
            }
        };
        UserStatus {
            user_id,
            username,
            is_online,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use chathub_core::error::AppError;
    use chathub_core::result::AppResult;

    use super::*;

    struct Names;

    #[async_trait]
    impl UserDirectory for Names {
        async fn get_username_by_id(&self, user_id: UserId) -> AppResult<String> {
            match user_id.as_i64() {
                1 => Ok("alice".into()),
                2 => Ok("bob".into()),
                _ => Err(AppError::not_found("no such user")),
            }
        }
    }

    fn tracker() -> PresenceTracker {
        PresenceTracker::new(Arc::new(Names))
    }

    #[test]
    fn test_counted_transitions() {
        let presence = tracker();
        assert!(presence.mark_online(UserId(1)));
        assert!(!presence.mark_online(UserId(1)));
        assert!(presence.is_online(UserId(1)));

        assert!(!presence.mark_offline(UserId(1)));
        assert!(presence.is_online(UserId(1)));
        assert!(presence.mark_offline(UserId(1)));
        assert!(!presence.is_online(UserId(1)));
    }

    #[test]
    fn test_offline_for_absent_user_is_noop() {
        let presence = tracker();
        assert!(!presence.mark_offline(UserId(5)));
        assert_eq!(presence.online_count(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_is_ordered_and_skips_unknown_users() {
        let presence = tracker();
        presence.mark_online(UserId(2));
        presence.mark_online(UserId(99));
        presence.mark_online(UserId(1));

        let snapshot = presence.snapshot().await;
        let names: Vec<_> = snapshot.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert!(snapshot.iter().all(|s| s.is_online));
        assert_eq!(presence.online_count(), 3);
    }

    #[tokio::test]
    async fn test_status_of_unknown_user_has_empty_name() {
        let presence = tracker();
        let status = presence.status_of(UserId(42), false).await;
        assert_eq!(status.user_id, UserId(42));
        assert_eq!(status.username, "");
        assert!(!status.is_online);
    }
}

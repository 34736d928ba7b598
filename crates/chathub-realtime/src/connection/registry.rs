//! Connection registry: tracks all live connections indexed by owner.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use chathub_core::error::AppError;
use chathub_core::result::AppResult;
use chathub_core::types::UserId;

use super::handle::{ConnectionHandle, ConnectionId};

#[derive(Debug, Default)]
struct Indexes {
    /// Connection ID → connection handle.
    by_id: HashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// User ID → that user's connection IDs, in registration order.
    by_user: HashMap<UserId, Vec<ConnectionId>>,
}

/// Thread-safe registry of every live WebSocket connection.
///
/// Both indexes live behind a single lock so they are always mutated
/// together. Lookups return cloned handles; callers send after the lock is
/// released.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<Indexes>,
}

impl ConnectionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection.
    ///
    /// A connection ID that is already registered is rejected and nothing
    /// is added.
    pub fn register(&self, handle: Arc<ConnectionHandle>) -> AppResult<()> {
        let mut inner = self.inner.write();
        if inner.by_id.contains_key(&handle.id) {
            return Err(AppError::internal(format!(
                "Connection {} is already registered",
                handle.id
            )));
        }
        inner
            .by_user
            .entry(handle.user_id)
            .or_default()
            .push(handle.id);
        inner.by_id.insert(handle.id, handle);
        Ok(())
    }

    /// Removes a connection, returning its handle if it was present.
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let mut inner = self.inner.write();
        let handle = inner.by_id.remove(conn_id)?;
        if let Some(ids) = inner.by_user.get_mut(&handle.user_id) {
            ids.retain(|id| id != conn_id);
            if ids.is_empty() {
                inner.by_user.remove(&handle.user_id);
            }
        }
        Some(handle)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.inner.read().by_id.get(conn_id).cloned()
    }

    /// Gets all live connections owned by a user.
    pub fn connections_for(&self, user_id: UserId) -> Vec<Arc<ConnectionHandle>> {
        let inner = self.inner.read();
        inner
            .by_user
            .get(&user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.by_id.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Gets every connection not owned by the given user.
    pub fn all_except(&self, user_id: UserId) -> Vec<Arc<ConnectionHandle>> {
        self.inner
            .read()
            .by_id
            .values()
            .filter(|handle| handle.user_id != user_id)
            .cloned()
            .collect()
    }

    /// Returns all connection handles.
    pub fn all(&self) -> Vec<Arc<ConnectionHandle>> {
        self.inner.read().by_id.values().cloned().collect()
    }

    /// Returns total number of live connections.
    pub fn connection_count(&self) -> usize {
        self.inner.read().by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(user: i64) -> Arc<ConnectionHandle> {
        let (handle, _rx) = ConnectionHandle::new(UserId(user), 8);
        Arc::new(handle)
    }

    fn ids(handles: &[Arc<ConnectionHandle>]) -> Vec<ConnectionId> {
        let mut ids: Vec<_> = handles.iter().map(|h| h.id).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_register_and_lookup_by_user() {
        let registry = ConnectionRegistry::new();
        let a1 = handle(1);
        let a2 = handle(1);
        let b1 = handle(2);
        registry.register(a1.clone()).unwrap();
        registry.register(a2.clone()).unwrap();
        registry.register(b1.clone()).unwrap();

        assert_eq!(registry.connection_count(), 3);
        assert_eq!(
            ids(&registry.connections_for(UserId(1))),
            ids(&[a1.clone(), a2.clone()])
        );
        assert_eq!(ids(&registry.all_except(UserId(1))), ids(&[b1]));
        assert!(registry.connections_for(UserId(3)).is_empty());
    }

    #[test]
    fn test_duplicate_register_is_rejected() {
        let registry = ConnectionRegistry::new();
        let a1 = handle(1);
        registry.register(a1.clone()).unwrap();

        let err = registry.register(a1.clone()).unwrap_err();
        assert_eq!(err.kind, chathub_core::error::ErrorKind::Internal);
        assert_eq!(registry.connection_count(), 1);
        assert_eq!(registry.connections_for(UserId(1)).len(), 1);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let a1 = handle(1);
        let a2 = handle(1);
        registry.register(a1.clone()).unwrap();
        registry.register(a2.clone()).unwrap();

        assert!(registry.unregister(&a1.id).is_some());
        assert!(registry.unregister(&a1.id).is_none());
        assert_eq!(ids(&registry.connections_for(UserId(1))), ids(&[a2.clone()]));

        assert!(registry.unregister(&a2.id).is_some());
        assert!(registry.connections_for(UserId(1)).is_empty());
        assert!(registry.all().is_empty());
    }

    #[test]
    fn test_interleaved_register_unregister_keeps_indexes_consistent() {
        let registry = ConnectionRegistry::new();
        let handles: Vec<_> = (0..12).map(|i| handle(i % 3 + 1)).collect();
        for (i, h) in handles.iter().enumerate() {
            registry.register(h.clone()).unwrap();
            if i % 4 == 3 {
                registry.unregister(&handles[i - 2].id);
            }
        }

        for user in 1..=3 {
            for h in registry.connections_for(UserId(user)) {
                assert_eq!(h.user_id, UserId(user));
                assert!(registry.get(&h.id).is_some());
            }
        }
        let per_user: usize = (1..=3)
            .map(|u| registry.connections_for(UserId(u)).len())
            .sum();
        assert_eq!(per_user, registry.connection_count());
        assert_eq!(registry.connection_count(), 9);
    }
}

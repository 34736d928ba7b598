//! Connection lifecycle guard.
//!
//! Every registered connection is owned by exactly one [`ConnectionGuard`].
//! The normal exit path awaits [`ConnectionGuard::disconnect`]; any other
//! exit (an early return, a cancelled task, a panic while dispatching) drops
//! the guard, which runs the same cleanup. The registry decides which caller
//! performs it, so cleanup happens once no matter how many paths race.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::server::RealtimeEngine;

use super::handle::ConnectionHandle;

/// Owns one registered connection and disconnects it when released.
#[derive(Debug)]
pub struct ConnectionGuard {
    engine: RealtimeEngine,
    handle: Arc<ConnectionHandle>,
    released: bool,
}

impl ConnectionGuard {
    pub(crate) fn new(engine: RealtimeEngine, handle: Arc<ConnectionHandle>) -> Self {
        Self {
            engine,
            handle,
            released: false,
        }
    }

    /// The guarded connection.
    pub fn handle(&self) -> &Arc<ConnectionHandle> {
        &self.handle
    }

    /// Disconnect now and wait for the offline announcement to go out.
    ///
    /// Returns `false` if something else already cleaned the connection up.
    pub async fn disconnect(mut self) -> bool {
        self.released = true;
        self.engine.disconnect(&self.handle.id).await
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let Some(detached) = self.engine.detach(&self.handle.id) else {
            return;
        };
        debug!(conn_id = %self.handle.id, "Connection released by drop");
        if !detached.went_offline {
            return;
        }

        let user_id = detached.handle.user_id;
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let engine = self.engine.clone();
                runtime.spawn(async move {
                    let failed = engine.announce(user_id, false).await;
                    engine.disconnect_all(failed).await;
                });
            }
            Err(_) => {
                warn!(user_id = %user_id, "No runtime available, offline status not announced");
            }
        }
    }
}

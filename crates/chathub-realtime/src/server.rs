//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use chathub_core::config::RealtimeConfig;
use chathub_core::result::AppResult;
use chathub_core::traits::{ActivityStore, ChatStore, TokenValidator, UserDirectory};
use chathub_core::types::UserId;

use crate::connection::heartbeat::{HeartbeatConfig, run_heartbeat};
use crate::connection::{
    ConnectionGuard, ConnectionHandle, ConnectionId, ConnectionRegistry, OutboundFrame,
    WsAuthenticator,
};
use crate::message::builder::{build_error, build_online_users, build_status_change};
use crate::message::serializer::encode;
use crate::metrics::RealtimeMetrics;
use crate::presence::PresenceTracker;
use crate::router::{MessageRouter, RouteError, Routed, fan_out};

/// External services the engine depends on.
#[derive(Clone)]
pub struct Collaborators {
    /// Validates upgrade tokens.
    pub tokens: Arc<dyn TokenValidator>,
    /// Resolves usernames.
    pub users: Arc<dyn UserDirectory>,
    /// Persists private messages.
    pub chats: Arc<dyn ChatStore>,
    /// Records sender activity.
    pub activity: Arc<dyn ActivityStore>,
}

/// A connection removed from the registry by this caller.
#[derive(Debug)]
pub(crate) struct Detached {
    pub(crate) handle: Arc<ConnectionHandle>,
    pub(crate) went_offline: bool,
}

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Live connections.
    pub registry: Arc<ConnectionRegistry>,
    /// Online users.
    pub presence: Arc<PresenceTracker>,
    /// Inbound message router.
    pub router: Arc<MessageRouter>,
    /// Upgrade authenticator.
    pub authenticator: WsAuthenticator,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: RealtimeConfig, collaborators: Collaborators) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let presence = Arc::new(PresenceTracker::new(collaborators.users.clone()));
        let router = Arc::new(MessageRouter::new(
            registry.clone(),
            presence.clone(),
            collaborators.users,
            collaborators.chats,
            collaborators.activity,
            metrics.clone(),
            config.max_message_bytes,
        ));
        let authenticator = WsAuthenticator::new(collaborators.tokens);

        info!(
            channel_buffer = config.channel_buffer_size,
            ping_interval = config.ping_interval_seconds,
            "Real-time engine initialized"
        );

        Self {
            registry,
            presence,
            router,
            authenticator,
            metrics,
            config,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Registers a new connection for an authenticated user.
    ///
    /// The new connection receives the presence snapshot first. If this is
    /// the user's first connection, every registered connection (including
    /// the new one) is told the user came online. The returned guard
    /// disconnects the connection when dropped; the receiver must be
    /// drained by the connection's writer task.
    pub async fn connect(
        &self,
        user_id: UserId,
    ) -> AppResult<(ConnectionGuard, mpsc::Receiver<OutboundFrame>)> {
        let (handle, outbound) = ConnectionHandle::new(user_id, self.config.channel_buffer_size);
        let handle = Arc::new(handle);

        self.registry.register(handle.clone())?;
        let guard = ConnectionGuard::new(self.clone(), handle.clone());
        let first = self.presence.mark_online(user_id);
        self.metrics.connection_opened();

        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            connections = self.registry.connection_count(),
            "WebSocket connection registered"
        );

        tokio::spawn(run_heartbeat(
            handle.clone(),
            HeartbeatConfig::from(&self.config),
        ));

        let report = encode(&build_online_users(self.presence.snapshot().await))?;
        if let Err(e) = handle.send_text(report) {
            warn!(conn_id = %handle.id, error = %e, "Failed to send presence snapshot");
            handle.close();
        }

        if first {
            let failed = self.announce(user_id, true).await;
            self.disconnect_all(failed).await;
        }

        Ok((guard, outbound))
    }

    /// Handles one inbound text frame from a registered connection.
    ///
    /// Protocol errors are answered on `origin` only. Peers that could not
    /// be written to are disconnected before this returns.
    pub async fn handle_inbound(
        &self,
        origin: &Arc<ConnectionHandle>,
        raw: &str,
    ) -> Result<Routed, RouteError> {
        origin.touch();
        self.metrics.message_received();

        match self.router.route(origin, raw).await {
            Ok(routed) => {
                self.disconnect_all(routed.failed.clone()).await;
                Ok(routed)
            }
            Err(err) => {
                self.metrics.protocol_error();
                self.reply_error(origin, &err);
                Err(err)
            }
        }
    }

    fn reply_error(&self, origin: &ConnectionHandle, err: &RouteError) {
        let sent = encode(&build_error(err.to_string())).and_then(|reply| origin.send_text(reply));
        match sent {
            Ok(()) => self.metrics.messages_sent(1),
            Err(e) => {
                warn!(conn_id = %origin.id, error = %e, "Failed to send error reply, closing connection");
                self.metrics.send_failed();
                origin.close();
            }
        }
    }

    /// Fully disconnects a connection.
    ///
    /// Idempotent: returns `true` only for the call that actually removed
    /// the connection. That call closes it, updates presence and, if the
    /// user has no connections left, announces them offline exactly once.
    /// Peers that fail during the announcement are disconnected too.
    pub async fn disconnect(&self, conn_id: &ConnectionId) -> bool {
        let Some(detached) = self.detach(conn_id) else {
            return false;
        };
        let mut pending = Vec::new();
        if detached.went_offline {
            pending = self.announce(detached.handle.user_id, false).await;
        }
        self.disconnect_all(pending).await;
        true
    }

    /// Disconnect every listed connection, following any peers that fail
    /// while the resulting offline notices go out.
    pub(crate) async fn disconnect_all(&self, mut pending: Vec<ConnectionId>) {
        while let Some(conn_id) = pending.pop() {
            if let Some(detached) = self.detach(&conn_id) {
                if detached.went_offline {
                    pending.extend(self.announce(detached.handle.user_id, false).await);
                }
            }
        }
    }

    /// Synchronous half of a disconnect: unregister, close, and count the
    /// user down. Returns `None` if another caller got there first.
    pub(crate) fn detach(&self, conn_id: &ConnectionId) -> Option<Detached> {
        let handle = self.registry.unregister(conn_id)?;
        handle.close();
        let went_offline = self.presence.mark_offline(handle.user_id);
        self.metrics.connection_closed();

        info!(
            conn_id = %conn_id,
            user_id = %handle.user_id,
            went_offline,
            connections = self.registry.connection_count(),
            "WebSocket connection unregistered"
        );

        Some(Detached {
            handle,
            went_offline,
        })
    }

    /// Tell every registered connection about a presence transition.
    ///
    /// The transition is re-checked after the username lookup; a notice
    /// overtaken by a newer transition of the same user is not sent.
    /// Returns the connections that could not be written to.
    pub(crate) async fn announce(&self, user_id: UserId, is_online: bool) -> Vec<ConnectionId> {
        let status = self.presence.status_of(user_id, is_online).await;
        if self.presence.is_online(user_id) != is_online {
            debug!(user_id = %user_id, is_online, "Superseded status change dropped");
            return Vec::new();
        }
        let payload = match encode(&build_status_change(status)) {
            Ok(p) => p,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to encode status change");
                return Vec::new();
            }
        };
        let fan = fan_out(&self.registry.all(), &payload, &self.metrics);
        debug!(
            user_id = %user_id,
            is_online,
            delivered = fan.delivered,
            "Status change announced"
        );
        fan.failed
    }

    /// Closes every connection. Their lifecycle guards finish the cleanup.
    pub fn close_all(&self) {
        let all = self.registry.all();
        for conn in &all {
            conn.close();
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the live connection count.
    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    /// Returns the number of online users.
    pub fn online_count(&self) -> usize {
        self.presence.online_count()
    }
}

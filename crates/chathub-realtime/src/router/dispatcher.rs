//! Classifies inbound frames and hands them to the matching route.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use chathub_core::traits::{ActivityStore, ChatStore, UserDirectory};
use chathub_core::types::UserId;

use crate::connection::{ConnectionHandle, ConnectionRegistry};
use crate::message::builder::build_online_users;
use crate::message::serializer::{decode, encode};
use crate::message::types::{Message, MessageKind};
use crate::message::validator::validate_inbound;
use crate::metrics::RealtimeMetrics;
use crate::presence::PresenceTracker;

use super::{Route, RouteError, Routed, fan_out};

/// Routes decoded messages for one hub.
///
/// Shares the registry and presence state with the engine and owns the
/// collaborators used by private delivery.
pub struct MessageRouter {
    pub(crate) registry: Arc<ConnectionRegistry>,
    pub(crate) presence: Arc<PresenceTracker>,
    pub(crate) users: Arc<dyn UserDirectory>,
    pub(crate) chats: Arc<dyn ChatStore>,
    pub(crate) activity: Arc<dyn ActivityStore>,
    pub(crate) metrics: Arc<RealtimeMetrics>,
    max_message_bytes: usize,
}

impl std::fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRouter")
            .field("max_message_bytes", &self.max_message_bytes)
            .finish()
    }
}

impl MessageRouter {
    /// Creates a new router.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        presence: Arc<PresenceTracker>,
        users: Arc<dyn UserDirectory>,
        chats: Arc<dyn ChatStore>,
        activity: Arc<dyn ActivityStore>,
        metrics: Arc<RealtimeMetrics>,
        max_message_bytes: usize,
    ) -> Self {
        Self {
            registry,
            presence,
            users,
            chats,
            activity,
            metrics,
            max_message_bytes,
        }
    }

    /// Validate, decode and dispatch one text frame from `origin`.
    pub async fn route(
        &self,
        origin: &Arc<ConnectionHandle>,
        raw: &str,
    ) -> Result<Routed, RouteError> {
        validate_inbound(raw, self.max_message_bytes).map_err(|e| {
            debug!(conn_id = %origin.id, error = %e, "Rejected inbound frame");
            RouteError::InvalidFormat
        })?;
        let msg = decode(raw).map_err(|e| {
            debug!(conn_id = %origin.id, error = %e, "Undecodable inbound frame");
            RouteError::InvalidFormat
        })?;

        match msg.kind() {
            MessageKind::Private => self.route_private(origin.user_id, msg).await,
            MessageKind::Broadcast => self.route_broadcast(origin.user_id, msg).await,
            MessageKind::OnlineUsers => self.route_online_users(origin).await,
            MessageKind::Unknown(kind) => {
                debug!(conn_id = %origin.id, kind = %kind, "Unhandled message type");
                Err(RouteError::UnhandledType)
            }
        }
    }

    /// Replace every server-owned envelope field of an outbound chat frame.
    ///
    /// The sender's name comes from the directory and is left empty when
    /// the lookup fails. Presence entries never ride on chat frames.
    pub(crate) async fn stamp(
        &self,
        kind: MessageKind,
        sender: UserId,
        msg: &mut Message,
    ) -> DateTime<Utc> {
        msg.kind = kind.as_str().to_string();
        msg.sender_id = sender;
        msg.sender_username = match self.users.get_username_by_id(sender).await {
            Ok(username) => username,
            Err(e) => {
                warn!(sender_id = %sender, error = %e, "Sender username lookup failed");
                String::new()
            }
        };
        let sent_at = Utc::now();
        msg.sent_at = Some(sent_at);
        msg.online_users.clear();
        sent_at
    }

    /// Reply to the requester with the current presence snapshot.
    async fn route_online_users(
        &self,
        origin: &Arc<ConnectionHandle>,
    ) -> Result<Routed, RouteError> {
        let report = build_online_users(self.presence.snapshot().await);
        let payload = encode(&report).map_err(|e| {
            warn!(error = %e, "Failed to encode presence report");
            RouteError::Internal
        })?;
        let fan = fan_out(std::slice::from_ref(origin), &payload, &self.metrics);
        Ok(Routed {
            route: Route::OnlineUsers,
            delivered: fan.delivered,
            failed: fan.failed,
        })
    }
}

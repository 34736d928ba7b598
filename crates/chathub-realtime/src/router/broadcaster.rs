//! Fan-out of one encoded payload to a set of connections.

use std::sync::Arc;

use tracing::{debug, warn};

use chathub_core::types::UserId;

use crate::connection::{ConnectionHandle, ConnectionId};
use crate::message::serializer::encode;
use crate::message::types::{Message, MessageKind};
use crate::metrics::RealtimeMetrics;

use super::dispatcher::MessageRouter;
use super::{Route, RouteError, Routed};

/// Result of a fan-out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FanOut {
    /// Connections the payload was queued on.
    pub delivered: usize,
    /// Connections that failed and were force-closed.
    pub failed: Vec<ConnectionId>,
}

/// Queue `payload` on every target.
///
/// Targets are a snapshot taken by the caller, so no registry lock is held
/// here. A target whose queue is full or gone is force-closed and reported
/// in [`FanOut::failed`]; the remaining targets are still served.
pub fn fan_out(
    targets: &[Arc<ConnectionHandle>],
    payload: &str,
    metrics: &RealtimeMetrics,
) -> FanOut {
    let mut result = FanOut::default();
    for target in targets {
        match target.send_text(payload) {
            Ok(()) => result.delivered += 1,
            Err(e) => {
                warn!(
                    conn_id = %target.id,
                    user_id = %target.user_id,
                    error = %e,
                    "Write to peer failed, closing connection"
                );
                metrics.send_failed();
                target.close();
                result.failed.push(target.id);
            }
        }
    }
    metrics.messages_sent(result.delivered as u64);
    result
}

impl MessageRouter {
    /// Deliver a broadcast to every connection not owned by the sender.
    ///
    /// Carries only the body from the client; a broadcast has no recipient.
    pub(crate) async fn route_broadcast(
        &self,
        sender: UserId,
        mut msg: Message,
    ) -> Result<Routed, RouteError> {
        self.stamp(MessageKind::Broadcast, sender, &mut msg).await;
        msg.receiver_id = UserId::default();

        let payload = encode(&msg).map_err(|e| {
            warn!(error = %e, "Failed to encode broadcast");
            RouteError::Internal
        })?;
        let targets = self.registry.all_except(sender);
        let fan = fan_out(&targets, &payload, &self.metrics);

        debug!(
            sender_id = %sender,
            delivered = fan.delivered,
            failed = fan.failed.len(),
            "Broadcast delivered"
        );

        Ok(Routed {
            route: Route::Broadcast,
            delivered: fan.delivered,
            failed: fan.failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_out_skips_and_closes_failed_peers() {
        let metrics = RealtimeMetrics::new();
        let (ok, mut ok_rx) = ConnectionHandle::new(UserId(1), 4);
        let (full, _full_rx) = ConnectionHandle::new(UserId(2), 1);
        let (gone, gone_rx) = ConnectionHandle::new(UserId(3), 4);
        full.send_text("backlog").unwrap();
        drop(gone_rx);

        let (ok, full, gone) = (Arc::new(ok), Arc::new(full), Arc::new(gone));
        let result = fan_out(&[full.clone(), ok.clone(), gone.clone()], "hi", &metrics);

        assert_eq!(result.delivered, 1);
        assert_eq!(result.failed, vec![full.id, gone.id]);
        assert!(full.is_closed());
        assert!(gone.is_closed());
        assert!(!ok.is_closed());
        assert!(ok_rx.try_recv().is_ok());
        assert_eq!(metrics.snapshot().send_failures, 2);
        assert_eq!(metrics.snapshot().messages_sent, 1);
    }
}

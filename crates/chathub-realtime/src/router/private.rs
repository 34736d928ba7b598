//! Private message delivery and persistence.

use tracing::{debug, warn};

use chathub_core::types::UserId;
use chathub_entity::chat::ChatRecord;

use crate::message::serializer::encode;
use crate::message::types::{Message, MessageKind};

use super::dispatcher::MessageRouter;
use super::{Route, RouteError, Routed, fan_out};

impl MessageRouter {
    /// Deliver a private message to every live connection of its recipient,
    /// then persist it and refresh the sender's activity.
    ///
    /// The sender id, sender username and timestamp are always the
    /// server's; client-supplied presence entries are dropped. Delivery is never undone by a later persistence failure,
    /// and an offline recipient still gets the message stored.
    pub(crate) async fn route_private(
        &self,
        sender: UserId,
        mut msg: Message,
    ) -> Result<Routed, RouteError> {
        if msg.receiver_id.as_i64() <= 0 {
            return Err(RouteError::InvalidRecipient);
        }
        let receiver = msg.receiver_id;

        let sent_at = self.stamp(MessageKind::Private, sender, &mut msg).await;

        let payload = encode(&msg).map_err(|e| {
            warn!(error = %e, "Failed to encode private message");
            RouteError::Internal
        })?;
        let targets = self.registry.connections_for(receiver);
        let fan = fan_out(&targets, &payload, &self.metrics);

        let record = ChatRecord::new(
            sender.as_i64(),
            receiver.as_i64(),
            msg.message,
            sent_at,
            msg.sender_username,
        );
        let persisted = match self.chats.save_chat_message(&record).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    sender_id = %sender,
                    receiver_id = %receiver,
                    error = %e,
                    "Failed to persist chat message"
                );
                self.metrics.persist_failed();
                false
            }
        };
        if let Err(e) = self.activity.update_last_activity(sender).await {
            warn!(user_id = %sender, error = %e, "Failed to update last activity");
        }

        debug!(
            sender_id = %sender,
            receiver_id = %receiver,
            delivered = fan.delivered,
            persisted,
            "Private message routed"
        );

        Ok(Routed {
            route: Route::Private { persisted },
            delivered: fan.delivered,
            failed: fan.failed,
        })
    }
}

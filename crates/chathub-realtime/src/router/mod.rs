//! Inbound message routing: classification, private delivery, and fan-out.

pub mod broadcaster;
pub mod dispatcher;
pub mod private;

use thiserror::Error;

use crate::connection::ConnectionId;

pub use broadcaster::{FanOut, fan_out};
pub use dispatcher::MessageRouter;

/// A frame the router refused. The reason is sent back to the originating
/// connection only; the connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Oversized, empty, or undecodable frame.
    #[error("Invalid message format")]
    InvalidFormat,
    /// Private message without a usable recipient.
    #[error("Invalid user IDs provided")]
    InvalidRecipient,
    /// Type the hub does not route.
    #[error("Unhandled message type")]
    UnhandledType,
    /// The reply could not be encoded.
    #[error("Internal server error")]
    Internal,
}

/// What a successfully routed message did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Private message; `persisted` is false when the chat store failed.
    Private {
        /// Whether the chat record was saved.
        persisted: bool,
    },
    /// Broadcast to every other user.
    Broadcast,
    /// Presence report sent back to the requester.
    OnlineUsers,
}

/// Outcome of routing one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    /// Which route was taken.
    pub route: Route,
    /// Connections the payload was queued on.
    pub delivered: usize,
    /// Connections that could not be written to. They are already closed
    /// and still need a full disconnect.
    pub failed: Vec<ConnectionId>,
}

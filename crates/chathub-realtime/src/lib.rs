//! # chathub-realtime
//!
//! Real-time WebSocket engine for the LiveChat hub. Provides:
//!
//! - Connection registry mapping live connections to their owning user
//! - Counted presence tracking with online/offline status-change fan-out
//! - Message routing for private, broadcast, and presence-report messages
//! - Connection lifecycle guard that cleans up exactly once
//! - Ping/pong heartbeat for half-open connection reclamation
//!
//! The engine is transport-agnostic: each connection is a bounded queue of
//! [`connection::OutboundFrame`]s drained by a single writer task owned by
//! the HTTP layer.

pub mod connection;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod router;
pub mod server;

pub use connection::{ConnectionGuard, ConnectionHandle, ConnectionId, ConnectionRegistry};
pub use presence::PresenceTracker;
pub use router::{MessageRouter, RouteError, Routed};
pub use server::{Collaborators, RealtimeEngine};

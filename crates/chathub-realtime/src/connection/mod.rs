//! WebSocket connection management: handles, registry, lifecycle, heartbeat, auth.

pub mod authenticator;
pub mod handle;
pub mod heartbeat;
pub mod lifecycle;
pub mod registry;

pub use authenticator::WsAuthenticator;
pub use handle::{ConnectionHandle, ConnectionId, OutboundFrame};
pub use lifecycle::ConnectionGuard;
pub use registry::ConnectionRegistry;

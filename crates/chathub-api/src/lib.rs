//! # chathub-api
//!
//! HTTP layer for the LiveChat hub built on Axum.
//!
//! Provides the authenticated WebSocket upgrade, the chat-history endpoint,
//! health checks, CORS and request logging, and the mapping from
//! [`chathub_core::AppError`] to HTTP responses.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;

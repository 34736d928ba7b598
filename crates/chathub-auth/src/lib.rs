//! # chathub-auth
//!
//! Token handling for the LiveChat hub.
//!
//! ## Modules
//!
//! - `jwt`: HS256 token creation and validation; the decoder is the
//!   connection-time auth gate.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};

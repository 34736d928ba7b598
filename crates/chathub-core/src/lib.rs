//! # chathub-core
//!
//! Core crate for the LiveChat hub. Contains configuration schemas, the
//! collaborator traits the realtime engine consumes, typed identifiers,
//! and the unified error system.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;

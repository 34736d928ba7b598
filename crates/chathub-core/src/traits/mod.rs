//! Collaborator traits consumed by the realtime engine and implemented by
//! other crates (`chathub-auth`, `chathub-database`).

pub mod auth;
pub mod chat;

pub use auth::TokenValidator;
pub use chat::{ActivityStore, ChatStore, UserDirectory};

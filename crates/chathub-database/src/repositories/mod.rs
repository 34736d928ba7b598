//! Repository implementations for the hub's tables.

pub mod activity;
pub mod chat;
pub mod user;

pub use activity::ActivityRepository;
pub use chat::ChatRepository;
pub use user::UserRepository;

//! Last-activity tracking entities.

pub mod model;

pub use model::OnlineUser;

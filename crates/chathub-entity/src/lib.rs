//! # chathub-entity
//!
//! Domain entity models for the LiveChat hub. Every struct in this crate
//! represents a database table row. All entities derive `Debug`, `Clone`,
//! `Serialize`, `Deserialize`, and `sqlx::FromRow`.
//!
//! Identifiers are the raw `i64` primary keys; the typed `UserId` wrapper
//! lives in `chathub-core`.

pub mod activity;
pub mod chat;
pub mod user;

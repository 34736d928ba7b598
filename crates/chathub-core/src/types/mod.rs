//! Core type definitions used across the LiveChat workspace.

pub mod id;

pub use id::UserId;

//! Scheduled maintenance tasks for the LiveChat hub.
//!
//! This crate provides:
//! - A cron scheduler driving periodic jobs
//! - The inactivity sweep that prunes stale `online_users` markers

pub mod jobs;
pub mod scheduler;

pub use jobs::InactivityCleanupJob;
pub use scheduler::CronScheduler;

//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Scheduled maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler is started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Users whose last activity is older than this are swept from `online_users`.
    #[serde(default = "default_inactivity_minutes")]
    pub inactivity_minutes: i64,
    /// Cron expression (with seconds) for the inactivity sweep.
    #[serde(default = "default_cleanup_cron")]
    pub cleanup_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            inactivity_minutes: default_inactivity_minutes(),
            cleanup_cron: default_cleanup_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_inactivity_minutes() -> i64 {
    30
}

fn default_cleanup_cron() -> String {
    "0 0 * * * *".to_string()
}

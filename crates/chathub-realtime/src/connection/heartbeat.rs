//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::{debug, warn};

use chathub_core::config::RealtimeConfig;

use super::handle::ConnectionHandle;

/// Heartbeat configuration
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Grace period after a ping before the connection is considered dead
    pub ping_timeout: Duration,
}

impl HeartbeatConfig {
    /// Longest silence tolerated before the connection is reclaimed.
    pub fn max_idle(&self) -> Duration {
        self.ping_interval + self.ping_timeout
    }
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds.max(1)),
            ping_timeout: Duration::from_secs(config.ping_timeout_seconds),
        }
    }
}

/// Run heartbeat loop for a connection.
///
/// Sends periodic pings and force-closes the connection when the client
/// has been silent (no pong, no frames) for longer than
/// [`HeartbeatConfig::max_idle`]. Ends when the connection closes.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval_at(
        time::Instant::now() + config.ping_interval,
        config.ping_interval,
    );

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            _ = interval.tick() => {}
        }

        let idle = handle.idle_for();
        if idle > config.max_idle() {
            warn!(
                conn_id = %handle.id,
                user_id = %handle.user_id,
                idle_secs = idle.as_secs(),
                "Heartbeat timeout, closing connection"
            );
            handle.close();
            break;
        }

        if let Err(e) = handle.send_ping() {
            debug!(conn_id = %handle.id, error = %e, "Ping failed, closing connection");
            handle.close();
            break;
        }
    }

    debug!(conn_id = %handle.id, "Heartbeat loop ended");
}

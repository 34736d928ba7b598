//! Individual WebSocket connection handle.

use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use chathub_core::error::AppError;
use chathub_core::result::AppResult;
use chathub_core::types::UserId;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A frame queued for the connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// A JSON text frame.
    Text(String),
    /// A keepalive ping.
    Ping,
}

/// A handle to a single WebSocket connection.
///
/// The handle never touches the socket. Everything written to the client
/// goes through the bounded outbound queue, which exactly one writer task
/// drains. Closing the handle cancels its token; the reader, writer and
/// heartbeat tasks all watch that token.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: UserId,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Sender for outbound frames
    sender: mpsc::Sender<OutboundFrame>,
    /// Cancelled when the connection is force-closed
    close: CancellationToken,
    /// Last inbound frame or pong
    last_seen: Mutex<Instant>,
}

impl ConnectionHandle {
    /// Create a new connection handle and the receiving end of its queue.
    pub fn new(user_id: UserId, buffer: usize) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let now = Utc::now();
        let handle = Self {
            id: Uuid::new_v4(),
            user_id,
            connected_at: now,
            sender,
            close: CancellationToken::new(),
            last_seen: Mutex::new(Instant::now()),
        };
        (handle, receiver)
    }

    /// Queue a text frame.
    ///
    /// Never waits: a full queue means the peer is not keeping up and is
    /// reported as a transport error, same as a closed one.
    pub fn send_text(&self, text: impl Into<String>) -> AppResult<()> {
        self.enqueue(OutboundFrame::Text(text.into()))
    }

    /// Queue a ping frame.
    pub fn send_ping(&self) -> AppResult<()> {
        self.enqueue(OutboundFrame::Ping)
    }

    fn enqueue(&self, frame: OutboundFrame) -> AppResult<()> {
        if self.is_closed() {
            return Err(AppError::transport(format!(
                "Connection {} is closed",
                self.id
            )));
        }
        match self.sender.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(AppError::transport(format!(
                "Connection {} outbound queue is full",
                self.id
            ))),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.close();
                Err(AppError::transport(format!(
                    "Connection {} writer has stopped",
                    self.id
                )))
            }
        }
    }

    /// Force-close the connection. Safe to call more than once.
    pub fn close(&self) {
        self.close.cancel();
    }

    /// Whether the connection has been closed.
    pub fn is_closed(&self) -> bool {
        self.close.is_cancelled()
    }

    /// Resolves once the connection is closed.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.close.cancelled()
    }

    /// Record inbound traffic from the client.
    pub fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    /// Time since the client was last heard from.
    pub fn idle_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }
}

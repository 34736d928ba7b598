//! WebSocket upgrade handler.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use chathub_core::types::UserId;
use chathub_realtime::connection::{ConnectionHandle, OutboundFrame};

use crate::error::ApiError;
use crate::state::AppState;

/// How long the writer waits for the close frame to go out.
const CLOSE_FRAME_TIMEOUT: Duration = Duration::from_secs(1);

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
///
/// The token is checked before the upgrade headers, so an unauthenticated
/// request gets a 401 even when it is not a valid upgrade.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let user_id = state
        .realtime
        .authenticator
        .authenticate(query.token.as_deref())
        .await?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, user_id, socket)))
}

/// Drives one established connection until either side closes it.
async fn handle_ws_connection(state: AppState, user_id: UserId, socket: WebSocket) {
    let (ws_tx, mut ws_rx) = socket.split();

    let (guard, outbound) = match state.realtime.connect(user_id).await {
        Ok(registered) => registered,
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Failed to register WebSocket connection");
            return;
        }
    };
    let handle = guard.handle().clone();

    info!(
        conn_id = %handle.id,
        user_id = %user_id,
        "WebSocket connection established"
    );

    let writer = tokio::spawn(write_frames(ws_tx, outbound, handle.clone()));

    loop {
        let frame = tokio::select! {
            _ = handle.closed() => break,
            frame = ws_rx.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                dispatch(&state, &handle, text.as_str()).await;
            }
            Some(Ok(Message::Binary(data))) => {
                dispatch(&state, &handle, &String::from_utf8_lossy(&data)).await;
            }
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => handle.touch(),
            Some(Ok(Message::Close(_))) | None => break,
            Some(Err(e)) => {
                debug!(conn_id = %handle.id, error = %e, "WebSocket read failed");
                break;
            }
        }
    }

    guard.disconnect().await;
    if let Err(e) = writer.await {
        warn!(conn_id = %handle.id, error = %e, "WebSocket writer task failed");
    }

    info!(
        conn_id = %handle.id,
        user_id = %user_id,
        "WebSocket connection closed"
    );
}

async fn dispatch(state: &AppState, handle: &Arc<ConnectionHandle>, raw: &str) {
    if let Err(e) = state.realtime.handle_inbound(handle, raw).await {
        debug!(conn_id = %handle.id, error = %e, "Inbound message rejected");
    }
}

/// The only task that writes to the socket.
async fn write_frames(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<OutboundFrame>,
    handle: Arc<ConnectionHandle>,
) {
    loop {
        let frame = tokio::select! {
            _ = handle.closed() => break,
            frame = outbound.recv() => frame,
        };
        let message = match frame {
            Some(OutboundFrame::Text(text)) => Message::Text(text.into()),
            Some(OutboundFrame::Ping) => Message::Ping(Bytes::new()),
            None => break,
        };

        let sent = tokio::select! {
            _ = handle.closed() => break,
            sent = sink.send(message) => sent,
        };
        if let Err(e) = sent {
            debug!(conn_id = %handle.id, error = %e, "WebSocket write failed");
            handle.close();
            return;
        }
    }

    if tokio::time::timeout(CLOSE_FRAME_TIMEOUT, sink.send(Message::Close(None)))
        .await
        .is_err()
    {
        debug!(conn_id = %handle.id, "Timed out sending close frame");
    }
}

//! WebSocket handler — intents in, room snapshots out.
//!
//! DESIGN
//! ======
//! On upgrade, generates a connection ID, registers an outbound channel with
//! the session table, and enters a `select!` loop:
//! - Incoming client frames → decode into an `Intent` → `Sessions::apply`
//! - Room updates queued by any session mutation → forward to the client
//!
//! Nothing here touches room state directly. Every inbound problem (bad
//! JSON, unknown event, invalid card) is logged and dropped; no client input
//! closes the connection.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `connected` with `connectionId`
//! 2. Client sends intents → session applies and broadcasts `roomUpdate`
//! 3. Close, socket error, or eviction (outbound channel closed by the
//!    session table) → `Sessions::disconnect` → cleanup

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::frame::{Data, EVENT_CONNECTED, Frame};
use crate::intent::Intent;
use crate::services::registry::{ConnectionId, RoomSnapshot};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
enum SendError {
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("socket send failed: {0}")]
    Socket(#[from] axum::Error),
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();

    // Per-connection channel for room updates from any session mutation.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.config.client_channel_capacity);
    state.sessions.write().await.connect(connection_id, client_tx);

    let welcome = Frame::new(EVENT_CONNECTED, Data::new()).with_data("connectionId", connection_id.to_string());
    match send_frame(&mut socket, &welcome).await {
        Ok(()) => {
            info!(%connection_id, "ws: client connected");
            relay(&mut socket, &state, connection_id, &mut client_rx).await;
        }
        Err(e) => warn!(%connection_id, error = %e, "ws: welcome failed"),
    }

    let rooms = {
        let mut sessions = state.sessions.write().await;
        sessions.disconnect(connection_id);
        sessions.room_count()
    };
    info!(%connection_id, rooms, "ws: client disconnected");
}

async fn relay(
    socket: &mut WebSocket,
    state: &AppState,
    connection_id: ConnectionId,
    client_rx: &mut mpsc::Receiver<Frame>,
) {
    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        process_inbound_text(state, connection_id, text.as_str()).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            frame = client_rx.recv() => {
                // Sender dropped: the session table evicted this connection.
                let Some(frame) = frame else {
                    info!(%connection_id, "ws: evicted, closing");
                    if let Err(e) = socket.send(Message::Close(None)).await {
                        debug!(%connection_id, error = %e, "ws: close failed");
                    }
                    break;
                };
                if let Err(e) = send_frame(socket, &frame).await {
                    debug!(%connection_id, error = %e, "ws: send failed");
                    break;
                }
            }
        }
    }
}

// =============================================================================
// INTENT DISPATCH
// =============================================================================

/// Decode one inbound text frame and apply it. Returns the broadcast
/// snapshot, or `None` when the frame was dropped.
async fn process_inbound_text(state: &AppState, connection_id: ConnectionId, text: &str) -> Option<RoomSnapshot> {
    let frame: Frame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            warn!(%connection_id, error = %e, "ws: invalid inbound frame");
            return None;
        }
    };

    let intent = match Intent::try_from(&frame) {
        Ok(intent) => intent,
        Err(e) => {
            warn!(%connection_id, id = %frame.id, event = %frame.event, error = %e, "ws: invalid intent");
            return None;
        }
    };

    debug!(%connection_id, id = %frame.id, intent = intent.name(), "ws: recv intent");
    state.sessions.write().await.apply(connection_id, intent)
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), SendError> {
    let json = serde_json::to_string(frame)?;
    debug!(id = %frame.id, event = %frame.event, "ws: send frame");
    socket.send(Message::Text(json.into())).await?;
    Ok(())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;

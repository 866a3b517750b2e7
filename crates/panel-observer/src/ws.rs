//! `WebSocket` handler for live panel updates.
//!
//! Clients connect to `GET /ws/panel`, are registered with the
//! [`BroadcastHub`](crate::hub::BroadcastHub), and receive one JSON text
//! frame per change event:
//!
//! ```json
//! {"channel":"state","accelerator":512,"brake":0}
//! ```
//!
//! Nothing is replayed on connect. Frames sent by the client are ignored
//! apart from close; pings are answered by axum itself.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` and start streaming.
///
/// # Route
///
/// `GET /ws/panel`
pub async fn ws_panel(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Forward hub messages to the socket until either side goes away, then
/// remove the registration.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut viewer = state.hub.connect();
    let id = viewer.id();
    debug!(viewer = %id, viewers = state.hub.viewer_count(), "viewer connected");

    loop {
        tokio::select! {
            outgoing = viewer.recv() => {
                let Some(message) = outgoing else {
                    debug!(viewer = %id, "viewer dropped by hub");
                    break;
                };
                let json = match serde_json::to_string(&message) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!(viewer = %id, error = %e, "failed to serialize channel message");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(viewer = %id, "viewer disconnected (send failed)");
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(viewer = %id, "viewer disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(viewer = %id, error = %e, "websocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    state.hub.disconnect(id);
}

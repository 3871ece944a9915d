//! WebSocket handler for live reload.
//!
//! Each connection registers a session and forwards its messages to the
//! client until either side goes away.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;

use super::registry::{Session, SessionRegistry};

/// Handle WebSocket upgrade for live reload.
///
/// Only routed in development mode, with the live reload registry as state.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(registry): State<Arc<SessionRegistry>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, registry))
}

/// Handle an established WebSocket connection.
async fn handle_socket(mut socket: WebSocket, registry: Arc<SessionRegistry>) {
    let (session, mut outbound) = Session::channel();
    let id = registry.add(session);

    loop {
        tokio::select! {
            // Forward broadcasts to client
            message = outbound.recv() => {
                let Some(text) = message else { break };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            // Client messages are ignored; this only watches for close
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    registry.remove(id);
}

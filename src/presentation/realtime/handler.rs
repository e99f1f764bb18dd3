//! Socket Connection Handler
//!
//! Accepts socket connections and keeps them registered with the hub while
//! they stay open. Client events are not dispatched anywhere.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::SocketEvent;
use crate::startup::AppState;

/// Socket upgrade handler
pub async fn socket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let max_message_size = state.settings.socket.max_message_size;
    let max_frame_size = state.settings.socket.max_frame_size;

    ws.max_message_size(max_message_size)
        .max_frame_size(max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual socket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let socket_id = Uuid::new_v4().to_string();
    tracing::debug!(socket_id = %socket_id, "New socket connection");

    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    // Create channel for outgoing events
    let (tx, mut rx) = mpsc::unbounded_channel::<SocketEvent>();

    // Spawn task to forward events from channel to the socket
    let writer_id = socket_id.clone();
    let sender_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(socket_id = %writer_id, "Failed to serialize event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    state.hub.register(socket_id.clone(), tx);
    state
        .hub
        .send_to(&socket_id, SocketEvent::connected(&socket_id));

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                tracing::debug!(
                    socket_id = %socket_id,
                    bytes = text.len(),
                    "Ignoring client event"
                );
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(socket_id = %socket_id, error = %e, "Socket read error");
                break;
            }
        }
    }

    state.hub.unregister(&socket_id);
    sender_task.abort();
    tracing::debug!(socket_id = %socket_id, "Socket disconnected");
}

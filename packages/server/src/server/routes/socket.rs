//! `GET /socket` - real-time event channel.
//!
//! Frames are JSON envelopes `{ "event": <name>, "data": <payload> }`. The
//! server greets each connection with a `news` event and logs whatever named
//! events the client sends. Nothing here touches the workflow.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::Response,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl SocketEvent {
    pub fn greeting() -> Self {
        Self {
            event: "news".to_string(),
            data: json!({ "hello": "world" }),
        }
    }
}

pub async fn socket_handler(ws: WebSocketUpgrade) -> Response {
    let conn_id = Uuid::new_v4();
    debug!(conn_id = %conn_id, "Socket upgrade requested");
    ws.on_upgrade(move |socket| handle_socket(socket, conn_id))
}

async fn handle_socket(mut socket: WebSocket, conn_id: Uuid) {
    info!(conn_id = %conn_id, "Socket connected");

    match serde_json::to_string(&SocketEvent::greeting()) {
        Ok(greeting) => {
            if socket.send(Message::Text(greeting)).await.is_err() {
                debug!(conn_id = %conn_id, "Socket closed before greeting");
                return;
            }
        }
        Err(e) => warn!(conn_id = %conn_id, error = %e, "Failed to encode greeting"),
    }

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => log_client_event(conn_id, &text),
            Message::Binary(_) => {
                warn!(conn_id = %conn_id, "Ignoring binary frame");
            }
            Message::Close(_) => break,
            // Axum answers pings itself
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    info!(conn_id = %conn_id, "Socket disconnected");
}

fn log_client_event(conn_id: Uuid, text: &str) {
    match parse_client_event(text) {
        Some(event) => {
            info!(conn_id = %conn_id, event = %event.event, data = %event.data, "Client event");
        }
        None => {
            warn!(conn_id = %conn_id, frame = %text, "Malformed client event");
        }
    }
}

fn parse_client_event(text: &str) -> Option<SocketEvent> {
    serde_json::from_str(text).ok()
}

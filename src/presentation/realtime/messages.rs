//! Socket Messages
//!
//! Wire shapes exchanged with socket clients and between nodes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Event name sent to a client right after it connects
pub const CONNECTED_EVENT: &str = "connected";

/// Named event with an arbitrary JSON payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl SocketEvent {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Greeting carrying the id assigned to the socket
    pub fn connected(socket_id: &str) -> Self {
        Self::new(CONNECTED_EVENT, json!({ "socketId": socket_id }))
    }
}

/// Broadcast relayed between nodes over Redis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Node that published the broadcast
    pub origin: Uuid,
    #[serde(flatten)]
    pub event: SocketEvent,
}

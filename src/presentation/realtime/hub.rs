//! Socket Hub
//!
//! Registry of the sockets connected to this node.

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::messages::SocketEvent;
use crate::infrastructure::metrics;

/// Outbound queue of one socket
pub type SocketSender = mpsc::UnboundedSender<SocketEvent>;

/// Tracks connected sockets and fans events out to them
pub struct SocketHub {
    /// Socket ID -> outbound queue
    sockets: DashMap<String, SocketSender>,
}

impl SocketHub {
    pub fn new() -> Self {
        Self {
            sockets: DashMap::new(),
        }
    }

    /// Register a newly connected socket
    pub fn register(&self, socket_id: String, sender: SocketSender) {
        self.sockets.insert(socket_id.clone(), sender);
        metrics::set_socket_connections(self.sockets.len());

        tracing::info!(socket_id = %socket_id, "Socket registered");
    }

    /// Unregister a socket
    pub fn unregister(&self, socket_id: &str) {
        if self.sockets.remove(socket_id).is_some() {
            metrics::set_socket_connections(self.sockets.len());
            tracing::info!(socket_id = %socket_id, "Socket unregistered");
        }
    }

    /// Deliver an event to every socket on this node.
    ///
    /// Returns how many sockets accepted it. Sockets whose queue is closed
    /// are dropped from the registry.
    pub fn broadcast(&self, event: &SocketEvent) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for entry in self.sockets.iter() {
            if entry.value().send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                closed.push(entry.key().clone());
            }
        }

        for socket_id in closed {
            self.unregister(&socket_id);
        }

        tracing::debug!(event = %event.event, delivered, "Broadcast delivered locally");
        delivered
    }

    /// Send an event to a single socket
    pub fn send_to(&self, socket_id: &str, event: SocketEvent) -> bool {
        self.sockets
            .get(socket_id)
            .map(|sender| sender.send(event).is_ok())
            .unwrap_or(false)
    }

    /// Number of sockets connected to this node
    pub fn socket_count(&self) -> usize {
        self.sockets.len()
    }
}

impl Default for SocketHub {
    fn default() -> Self {
        Self::new()
    }
}

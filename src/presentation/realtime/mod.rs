//! Real-time Sockets
//!
//! WebSocket endpoint, per-node socket hub, and the Redis adapter that
//! mirrors broadcasts across nodes.

pub mod adapter;
pub mod handler;
pub mod hub;
pub mod messages;

pub use adapter::RedisAdapter;
pub use handler::socket_handler;
pub use hub::SocketHub;
pub use messages::{Envelope, SocketEvent};

//! Cache Module
//!
//! Redis connection management and pub/sub plumbing.
//!
//! This module provides:
//! - Redis connection management with automatic reconnection
//! - A dedicated pub/sub subscriber connection
//! - Channel naming shared by every node of the cluster
//!
//! # Architecture
//!
//! ```text
//! +-------------------+        +-------------------+
//! |  RedisAdapter     |        |  RedisAdapter     |
//! |  (node A)         |        |  (node B)         |
//! +-------------------+        +-------------------+
//!    | PUBLISH   ^ SUBSCRIBE      | PUBLISH   ^ SUBSCRIBE
//!    v           |                v           |
//! +-----------------------------------------------+
//! |        Redis  "<prefix>#broadcast"            |
//! +-----------------------------------------------+
//! ```

use futures::Stream;
use redis::aio::ConnectionManager;
use redis::{Client, Msg};
use tracing::{info, instrument};

/// Creates a Redis connection manager with automatic reconnection.
///
/// The connection manager multiplexes commands over one connection and
/// reconnects when the connection is lost.
#[instrument(skip(url))]
pub async fn create_redis_client(url: &str) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(url)?;
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}

/// Opens a dedicated pub/sub connection subscribed to `channel`.
///
/// Pub/sub connections cannot issue regular commands, so this is always a
/// separate connection from the [`ConnectionManager`].
#[instrument(skip(url))]
pub async fn subscribe(
    url: &str,
    channel: &str,
) -> Result<impl Stream<Item = Msg> + Send, redis::RedisError> {
    let client = Client::open(url)?;
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.subscribe(channel).await?;
    info!("Subscribed to Redis channel");
    Ok(pubsub.into_on_message())
}

/// Publishes `payload` on `channel`, returning the number of subscribers reached.
pub async fn publish(
    conn: &ConnectionManager,
    channel: &str,
    payload: &str,
) -> Result<i64, redis::RedisError> {
    let mut conn = conn.clone();
    redis::cmd("PUBLISH")
        .arg(channel)
        .arg(payload)
        .query_async::<i64>(&mut conn)
        .await
}

/// Round-trips a PING to check connectivity.
pub async fn ping(conn: &ConnectionManager) -> Result<(), redis::RedisError> {
    let mut conn = conn.clone();
    redis::cmd("PING").query_async::<String>(&mut conn).await?;
    Ok(())
}

/// Channel names used on Redis.
pub mod keys {
    /// Suffix of the channel carrying socket broadcasts
    pub const BROADCAST: &str = "#broadcast";

    /// Generates the broadcast channel name for a prefix
    #[inline]
    pub fn broadcast_channel(prefix: &str) -> String {
        format!("{}{}", prefix, BROADCAST)
    }
}

//! Redis Adapter
//!
//! Mirrors hub broadcasts across every node sharing the same Redis.
//! A broadcast is published once and then delivered to local sockets;
//! each other node's subscriber task replays it into its own hub.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use redis::aio::ConnectionManager;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::hub::SocketHub;
use super::messages::{Envelope, SocketEvent};
use crate::config::RedisSettings;
use crate::infrastructure::cache::{self, keys};
use crate::shared::error::AppError;

/// First delay before resubscribing after the subscription drops
const RESUBSCRIBE_INITIAL: Duration = Duration::from_millis(100);
/// Upper bound for the resubscribe backoff
const RESUBSCRIBE_MAX: Duration = Duration::from_secs(5);

/// Pub/sub bridge between this node's hub and the cluster
#[derive(Clone)]
pub struct RedisAdapter {
    node_id: Uuid,
    channel: Arc<str>,
    conn: ConnectionManager,
    hub: Arc<SocketHub>,
    relay_active: Arc<AtomicBool>,
}

impl RedisAdapter {
    /// Connect to Redis and start relaying remote broadcasts into `hub`.
    ///
    /// The returned handle owns the subscriber task. It resubscribes with
    /// backoff whenever the subscription drops and runs until aborted.
    pub async fn connect(
        url: &str,
        settings: &RedisSettings,
        hub: Arc<SocketHub>,
    ) -> Result<(Self, JoinHandle<()>), AppError> {
        let node_id = Uuid::new_v4();
        let channel: Arc<str> = keys::broadcast_channel(&settings.channel_prefix).into();

        let conn = cache::create_redis_client(url).await?;
        let messages = payloads(url.to_owned(), channel.clone()).await?;
        let relay_active = Arc::new(AtomicBool::new(true));

        let resubscribe = {
            let url = url.to_owned();
            let channel = channel.clone();
            move || payloads(url.clone(), channel.clone())
        };
        let relay = tokio::spawn(run_relay(
            node_id,
            hub.clone(),
            relay_active.clone(),
            messages,
            resubscribe,
            RESUBSCRIBE_INITIAL,
        ));

        tracing::info!(node_id = %node_id, channel = %channel, "Redis adapter ready");

        Ok((
            Self {
                node_id,
                channel,
                conn,
                hub,
                relay_active,
            },
            relay,
        ))
    }

    /// Identifier stamped on envelopes published by this node
    pub fn node_id(&self) -> Uuid {
        self.node_id
    }

    /// Whether remote broadcasts are currently being received
    pub fn relay_active(&self) -> bool {
        self.relay_active.load(Ordering::Acquire)
    }

    /// Publish to the other nodes, then deliver to local sockets.
    ///
    /// Returns the number of local sockets reached. When publishing fails
    /// nothing is delivered, so the call can be retried.
    pub async fn broadcast(&self, event: SocketEvent) -> Result<usize, AppError> {
        let conn = self.conn.clone();
        let channel = self.channel.clone();

        publish_then_deliver(&self.hub, self.node_id, event, move |payload| async move {
            cache::publish(&conn, &channel, &payload).await
        })
        .await
    }

    /// Check the command connection
    pub async fn ping(&self) -> Result<(), AppError> {
        cache::ping(&self.conn).await.map_err(AppError::from)
    }
}

/// Subscribe to `channel`, yielding text payloads only.
async fn payloads(
    url: String,
    channel: Arc<str>,
) -> Result<impl Stream<Item = String> + Send, redis::RedisError> {
    let messages = cache::subscribe(&url, &channel).await?;
    Ok(messages.filter_map(|msg| {
        let payload = match msg.get_payload::<String>() {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping non-text pub/sub payload");
                None
            }
        };
        futures::future::ready(payload)
    }))
}

/// Replay remote envelopes into `hub`, resubscribing whenever the stream ends.
///
/// `active` is true while a subscription is open.
async fn run_relay<S, F, Fut, E>(
    node_id: Uuid,
    hub: Arc<SocketHub>,
    active: Arc<AtomicBool>,
    initial: S,
    mut resubscribe: F,
    initial_backoff: Duration,
) where
    S: Stream<Item = String> + Send,
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<S, E>> + Send,
    E: Display,
{
    let mut subscription = Some(initial);
    let mut backoff = initial_backoff;

    loop {
        if let Some(messages) = subscription.take() {
            active.store(true, Ordering::Release);
            backoff = initial_backoff;

            let mut messages = Box::pin(messages);
            while let Some(payload) = messages.next().await {
                if let Some(event) = accept_remote(node_id, &payload) {
                    hub.broadcast(&event);
                }
            }

            active.store(false, Ordering::Release);
            tracing::warn!("Redis subscription closed, resubscribing");
        }

        tokio::time::sleep(backoff).await;

        match resubscribe().await {
            Ok(messages) => {
                tracing::info!("Redis subscription restored");
                subscription = Some(messages);
            }
            Err(e) => {
                backoff = (backoff * 2).min(RESUBSCRIBE_MAX);
                tracing::warn!(
                    error = %e,
                    retry_in_ms = backoff.as_millis() as u64,
                    "Redis resubscribe failed"
                );
            }
        }
    }
}

/// Encode and publish `event`, delivering locally only once it is out.
async fn publish_then_deliver<F, Fut, E>(
    hub: &SocketHub,
    origin: Uuid,
    event: SocketEvent,
    publish: F,
) -> Result<usize, AppError>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<i64, E>>,
    AppError: From<E>,
{
    let envelope = Envelope { origin, event };
    let payload = serde_json::to_string(&envelope)
        .map_err(|e| AppError::Internal(format!("Failed to encode broadcast: {}", e)))?;

    let receivers = publish(payload).await?;
    let delivered = hub.broadcast(&envelope.event);

    tracing::debug!(event = %envelope.event.event, receivers, delivered, "Broadcast published");
    Ok(delivered)
}

/// Decode a pub/sub payload, ignoring envelopes this node published itself.
pub fn accept_remote(node_id: Uuid, payload: &str) -> Option<SocketEvent> {
    match serde_json::from_str::<Envelope>(payload) {
        Ok(envelope) if envelope.origin == node_id => None,
        Ok(envelope) => Some(envelope.event),
        Err(e) => {
            tracing::warn!(error = %e, "Dropping malformed broadcast envelope");
            None
        }
    }
}

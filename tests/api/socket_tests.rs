//! Socket Endpoint Tests

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use chat_backend::presentation::realtime::{SocketEvent, SocketHub};

use crate::common::TestApp;

const WAIT: Duration = Duration::from_secs(5);

/// Read the next text frame as JSON
async fn next_json<S>(socket: &mut S) -> Value
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = timeout(WAIT, socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .expect("socket error");
        if msg.is_text() {
            return serde_json::from_str(msg.to_text().unwrap()).unwrap();
        }
    }
}

async fn wait_for_count(hub: &SocketHub, expected: usize) {
    timeout(WAIT, async {
        while hub.socket_count() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("socket count never settled");
}

/// A new socket is greeted with its id and registered with the hub
#[tokio::test]
async fn test_socket_connect_greets_and_registers() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let (mut socket, _) = connect_async(format!("ws://{}/socket", addr)).await.unwrap();

    let greeting = next_json(&mut socket).await;
    assert_eq!(greeting["event"], "connected");
    let socket_id = greeting["data"]["socketId"].as_str().unwrap();
    assert!(!socket_id.is_empty());
    assert_eq!(app.state.hub.socket_count(), 1);

    socket.close(None).await.unwrap();
    wait_for_count(&app.state.hub, 0).await;
}

/// Hub broadcasts reach connected sockets
#[tokio::test]
async fn test_hub_broadcast_reaches_socket() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let (mut socket, _) = connect_async(format!("ws://{}/socket", addr)).await.unwrap();
    next_json(&mut socket).await;

    let delivered = app
        .state
        .hub
        .broadcast(&SocketEvent::new("announcement", json!({ "text": "hello" })));
    assert_eq!(delivered, 1);

    let event = next_json(&mut socket).await;
    assert_eq!(
        event,
        json!({ "event": "announcement", "data": { "text": "hello" } })
    );

    socket.close(None).await.unwrap();
}

/// Client events are ignored and the socket stays open
#[tokio::test]
async fn test_client_events_are_not_dispatched() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let (mut socket, _) = connect_async(format!("ws://{}/socket", addr)).await.unwrap();
    next_json(&mut socket).await;

    socket
        .send(Message::text(r#"{"event":"message","data":{"text":"hi"}}"#))
        .await
        .unwrap();
    app.state
        .hub
        .broadcast(&SocketEvent::new("ping", Value::Null));

    let event = next_json(&mut socket).await;
    assert_eq!(event["event"], "ping");
    assert_eq!(app.state.hub.socket_count(), 1);

    socket.close(None).await.unwrap();
}

/// Dropping the connection unregisters the socket
#[tokio::test]
async fn test_socket_unregisters_on_disconnect() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let (mut first, _) = connect_async(format!("ws://{}/socket", addr)).await.unwrap();
    let (mut second, _) = connect_async(format!("ws://{}/socket", addr)).await.unwrap();
    next_json(&mut first).await;
    next_json(&mut second).await;
    assert_eq!(app.state.hub.socket_count(), 2);

    drop(first);
    wait_for_count(&app.state.hub, 1).await;

    second.close(None).await.unwrap();
    wait_for_count(&app.state.hub, 0).await;
}

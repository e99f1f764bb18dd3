//! Global Error Responder Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{read_json, TestApp, TEST_BODY_LIMIT};

/// Unmatched routes yield 404 naming the path
#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let (status, body) = read_json(app.get("/api/v1/nowhere").await).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "/api/v1/nowhere not found" }));
}

/// Unmatched POST routes hit the same fallback
#[tokio::test]
async fn test_unknown_post_route_is_not_found() {
    let app = TestApp::new();

    let (status, body) = read_json(app.post_json("/rooms/42/messages", "{}").await).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "/rooms/42/messages not found");
}

/// A NotFound error raised by a handler is serialized with its own message
#[tokio::test]
async fn test_handler_not_found_error() {
    let app = TestApp::new();

    let (status, body) = read_json(app.get("/test/users/7").await).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "statusCode": 404, "message": "user not found", "status": "error" })
    );
}

#[tokio::test]
async fn test_handler_unauthorized_error() {
    let app = TestApp::new();

    let (status, body) = read_json(app.get("/test/unauthorized").await).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "statusCode": 401, "message": "Missing token", "status": "error" })
    );
}

/// Unrecognized errors become a generic 500 without their detail
#[tokio::test]
async fn test_unrecognized_error_is_generic_500() {
    let app = TestApp::new();

    let (status, body) = read_json(app.get("/test/internal").await).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "statusCode": 500, "message": "Internal server error", "status": "error" })
    );
}

/// Panics are answered like unrecognized errors
#[tokio::test]
async fn test_panic_is_generic_500() {
    let app = TestApp::new();

    let (status, body) = read_json(app.get("/test/panic").await).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}

/// Panicking routes still show up in the request counter
#[tokio::test]
async fn test_panic_is_counted_in_metrics() {
    let app = TestApp::new();
    app.get("/test/panic").await;

    let response = app.get("/metrics").await;
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains(
        r#"chat_backend_http_requests_total{method="GET",path="/test/panic",status="500"}"#
    ));
}

/// Bodies over the configured limit are rejected before the handler
#[tokio::test]
async fn test_oversized_body_is_payload_too_large() {
    let app = TestApp::new();
    let body = json!({ "text": "x".repeat(TEST_BODY_LIMIT * 2) }).to_string();

    let (status, body) = read_json(app.post_json("/test/echo", &body).await).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["statusCode"], 413);
    assert_eq!(body["status"], "error");
}

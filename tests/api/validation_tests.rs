//! Validation Interceptor Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{email_schema_document, read_json, TestApp};

/// Missing required field yields the schema library's first violation
#[tokio::test]
async fn test_missing_email_is_validation_error() {
    let app = TestApp::new();
    let expected = jsonschema::validator_for(&email_schema_document())
        .unwrap()
        .iter_errors(&json!({}))
        .next()
        .unwrap()
        .to_string();

    let (status, body) = read_json(app.post_json("/test/subscribe", "{}").await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "statusCode": 400, "message": expected, "status": "fail" })
    );
}

/// Valid payloads reach the handler with the original body
#[tokio::test]
async fn test_valid_payload_reaches_handler() {
    let app = TestApp::new();

    let (status, body) = read_json(app.post_json("/test/echo", r#"{"text":"hi"}"#).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "text": "hi" }));
}

/// Extra fields pass through untouched
#[tokio::test]
async fn test_body_is_not_rewritten() {
    let app = TestApp::new();
    let payload = json!({ "text": "hi", "meta": { "client": "web", "n": [1, 2, 3] } });

    let (status, body) = read_json(app.post_json("/test/echo", &payload.to_string()).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, payload);
}

#[tokio::test]
async fn test_wrong_type_is_validation_error() {
    let app = TestApp::new();

    let (status, body) = read_json(app.post_json("/test/echo", r#"{"text":42}"#).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = read_json(app.post_json("/test/echo", "{\"text\":").await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
}

/// The extractor form reports the rule's message
#[tokio::test]
async fn test_typed_extractor_rejects_bad_email() {
    let app = TestApp::new();

    let (status, body) =
        read_json(app.post_json("/test/typed", r#"{"email":"not-an-email"}"#).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "statusCode": 400, "message": "Invalid email format", "status": "fail" })
    );
}

#[tokio::test]
async fn test_typed_extractor_accepts_valid_email() {
    let app = TestApp::new();

    let (status, body) =
        read_json(app.post_json("/test/typed", r#"{"email":"a@example.com"}"#).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "subscribed": "a@example.com" }));
}

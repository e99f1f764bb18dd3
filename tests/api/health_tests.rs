//! Health Check API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{read_json, TestApp};

/// Test basic health check endpoint returns 200 OK
#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new();

    let (status, body) = read_json(app.get("/health").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("version").is_some());
}

/// Test liveness probe endpoint
#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new();

    let (status, body) = read_json(app.get("/health/live").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
}

/// Without Redis configured the node is ready on its own
#[tokio::test]
async fn test_readiness_probe_single_node() {
    let app = TestApp::new();

    let (status, body) = read_json(app.get("/health/ready").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["sockets"]["active_connections"], 0);
    assert_eq!(body["checks"]["sockets"]["cross_node"], false);
}

/// Metrics are exposed in Prometheus text format
#[tokio::test]
async fn test_metrics_endpoint() {
    let app = TestApp::new();
    app.get("/health").await;

    let response = app.get("/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("chat_backend_http_requests_total"));
}

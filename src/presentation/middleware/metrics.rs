//! Request Metrics Middleware

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::infrastructure::metrics;

/// Record count and latency per matched route.
///
/// Installed as a route layer so the route template, not the raw path,
/// becomes the label.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    // Route layers only wrap matched routes
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_default();

    let response = next.run(request).await;

    metrics::record_http_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

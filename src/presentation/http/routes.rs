//! Route Configuration
//!
//! Configures the HTTP routes and the error-handling tail of the stack.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{create_panic_layer, track_metrics};
use crate::presentation::realtime::socket_handler;
use crate::startup::AppState;

/// Create the main router with the built-in routes only
pub fn create_router(state: AppState) -> Router {
    build_router(state, Router::new())
}

/// Create the main router, merging application routes from `api`.
///
/// Everything merged here shares the body limit, the panic catcher and
/// the not-found fallback.
pub fn build_router(state: AppState, api: Router<AppState>) -> Router {
    let max_body_bytes = state.settings.http.max_body_bytes;

    Router::new()
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        // Real-time socket endpoint
        .route("/socket", get(socket_handler))
        .merge(api)
        // Panics become 500s inside the metrics layer so they are counted
        .route_layer(create_panic_layer())
        .route_layer(middleware::from_fn(track_metrics))
        .fallback(handlers::fallback::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

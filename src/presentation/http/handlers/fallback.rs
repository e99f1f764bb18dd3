//! Fallback Handler
//!
//! Answers every request that matched no route.

use axum::{http::StatusCode, http::Uri, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct NotFoundResponse {
    pub message: String,
}

/// 404 naming the requested path
pub async fn not_found(uri: Uri) -> (StatusCode, Json<NotFoundResponse>) {
    tracing::debug!(path = %uri.path(), "No route matched");
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            message: format!("{} not found", uri.path()),
        }),
    )
}

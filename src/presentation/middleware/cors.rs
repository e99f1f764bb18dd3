//! CORS Middleware Configuration

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsSettings;

/// Preflight cache lifetime for explicit origin lists
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(3600);

/// Create CORS layer from settings.
///
/// An empty origin list (or only unparsable entries) allows any origin.
pub fn create_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins).max_age(PREFLIGHT_MAX_AGE)
    }
}

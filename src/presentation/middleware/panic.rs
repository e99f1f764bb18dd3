//! Panic Recovery
//!
//! Turns a panicking handler into the generic 500 error body.

use std::any::Any;

use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;

use crate::shared::error::AppError;

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Create the layer that catches handler panics
pub fn create_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::Internal(format!("Handler panicked: {}", detail)).into_response()
}

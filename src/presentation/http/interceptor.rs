//! Validation Interceptor
//!
//! [`with_validation`] composes a [`Schema`] with any axum handler. The
//! result is itself a handler taking the same extractors: the body is
//! buffered and checked first, and the wrapped handler only runs when the
//! payload passes.
//!
//! ```rust,ignore
//! let schema = JsonSchema::compile(&json!({
//!     "type": "object",
//!     "required": ["text"],
//!     "properties": { "text": { "type": "string" } }
//! }))?;
//!
//! Router::new().route("/messages", post(with_validation(schema, send_message)));
//! ```

use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    extract::Request,
    handler::Handler,
    response::{IntoResponse, Response},
    RequestExt,
};
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};

use crate::shared::error::AppError;
use crate::shared::validation::Schema;

/// Wrap `handler` so it only runs for payloads accepted by `schema`.
pub fn with_validation<H, S>(schema: S, handler: H) -> Validated<H, S>
where
    S: Schema,
{
    Validated {
        handler,
        schema: Arc::new(schema),
    }
}

/// Handler produced by [`with_validation`]
pub struct Validated<H, S> {
    handler: H,
    schema: Arc<S>,
}

impl<H: Clone, S> Clone for Validated<H, S> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            schema: self.schema.clone(),
        }
    }
}

impl<H, S, T, St> Handler<T, St> for Validated<H, S>
where
    H: Handler<T, St>,
    S: Schema + 'static,
    St: Send + 'static,
    T: 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, req: Request, state: St) -> Self::Future {
        Box::pin(async move {
            match validate_request(self.schema.as_ref(), req).await {
                Ok(req) => self.handler.call(req, state).await,
                Err(e) => e.into_response(),
            }
        })
    }
}

/// Buffer and check the body, handing back an equivalent request.
async fn validate_request<S>(schema: &S, req: Request) -> Result<Request, AppError>
where
    S: Schema + ?Sized,
{
    let (parts, body) = req.with_limited_body().into_parts();
    let bytes = body::to_bytes(body, usize::MAX)
        .await
        .map_err(body_error)?;

    // An absent body is checked as an empty object
    let payload = if bytes.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?
    };

    if let Err(violation) = schema.validate(&payload).await {
        tracing::debug!(
            path = %parts.uri.path(),
            violation = %violation,
            "Request body failed validation"
        );
        return Err(violation.into());
    }

    Ok(Request::from_parts(parts, Body::from(bytes)))
}

fn body_error(err: axum::Error) -> AppError {
    if find_cause::<LengthLimitError>(&err).is_some() {
        AppError::PayloadTooLarge("Request body exceeds the size limit".into())
    } else {
        AppError::BadRequest(format!("Failed to read request body: {}", err))
    }
}

/// Walk an error chain looking for a specific cause
fn find_cause<'a, T: Error + 'static>(err: &'a (dyn Error + 'static)) -> Option<&'a T> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(typed) = e.downcast_ref::<T>() {
            return Some(typed);
        }
        current = e.source();
    }
    None
}

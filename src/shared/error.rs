//! Application Error Types
//!
//! Centralized error handling with Axum integration.
//!
//! Every error a handler can return is an [`AppError`]. The recognized
//! categories form the closed [`ErrorKind`] set; each fixes its HTTP status
//! code and status label, and all of them serialize through
//! [`AppError::serialize`]. Anything outside that set is logged and answered
//! with a generic 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::infrastructure::metrics;

/// Generic message returned for errors outside the recognized taxonomy
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Recognized error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    BadRequest,
    NotFound,
    Unauthorized,
    PayloadTooLarge,
    ServiceUnavailable,
}

/// Status label carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStatus {
    /// The request itself was rejected (bad input)
    Fail,
    /// The request could not be served
    Error,
}

impl ErrorKind {
    /// HTTP status fixed for this kind
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Status label fixed for this kind
    pub fn status(self) -> ErrorStatus {
        match self {
            ErrorKind::Validation | ErrorKind::BadRequest => ErrorStatus::Fail,
            ErrorKind::NotFound
            | ErrorKind::Unauthorized
            | ErrorKind::PayloadTooLarge
            | ErrorKind::ServiceUnavailable => ErrorStatus::Error,
        }
    }

    /// Stable name used in logs and metrics
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::PayloadTooLarge => "payload_too_large",
            ErrorKind::ServiceUnavailable => "service_unavailable",
        }
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub status: ErrorStatus,
}

impl AppError {
    /// The recognized category, or `None` for unexpected failures
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::Validation(_) => Some(ErrorKind::Validation),
            AppError::BadRequest(_) => Some(ErrorKind::BadRequest),
            AppError::NotFound(_) => Some(ErrorKind::NotFound),
            AppError::Unauthorized(_) => Some(ErrorKind::Unauthorized),
            AppError::PayloadTooLarge(_) => Some(ErrorKind::PayloadTooLarge),
            AppError::ServiceUnavailable(_) => Some(ErrorKind::ServiceUnavailable),
            AppError::Internal(_) | AppError::Redis(_) => None,
        }
    }

    /// HTTP status this error is answered with
    pub fn status_code(&self) -> StatusCode {
        self.kind()
            .map(ErrorKind::status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Message shown to the client.
    ///
    /// Unrecognized errors never expose their detail.
    pub fn client_message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::ServiceUnavailable(msg) => msg,
            AppError::Internal(_) | AppError::Redis(_) => INTERNAL_ERROR_MESSAGE,
        }
    }

    /// Build the JSON body for this error
    pub fn serialize(&self) -> ErrorResponse {
        ErrorResponse {
            status_code: self.status_code().as_u16(),
            message: self.client_message().to_string(),
            status: self
                .kind()
                .map(ErrorKind::status)
                .unwrap_or(ErrorStatus::Error),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.kind() {
            Some(kind) => {
                metrics::record_error(kind.as_str());
                if kind == ErrorKind::ServiceUnavailable {
                    tracing::warn!(kind = kind.as_str(), error = %self, "Request failed");
                } else {
                    tracing::debug!(kind = kind.as_str(), error = %self, "Request rejected");
                }
            }
            None => {
                metrics::record_error("internal");
                tracing::error!(error = %self, "Unhandled error");
            }
        }

        (self.status_code(), Json(self.serialize())).into_response()
    }
}

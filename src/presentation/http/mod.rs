//! HTTP Layer
//!
//! Routes, handlers, extractors and the validation interceptor.

pub mod extractors;
pub mod handlers;
pub mod interceptor;
pub mod routes;

pub use extractors::ValidatedJson;
pub use interceptor::{with_validation, Validated};

//! HTTP Handlers
//!
//! Request handlers for the built-in endpoints.

pub mod fallback;
pub mod health;

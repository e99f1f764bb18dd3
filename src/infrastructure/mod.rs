//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Redis connection and pub/sub (cache)
//! - Prometheus metrics

pub mod cache;
pub mod metrics;

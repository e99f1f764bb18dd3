//! Presentation Layer
//!
//! HTTP routes and real-time socket handlers.

pub mod http;
pub mod middleware;
pub mod realtime;

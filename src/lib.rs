//! # Chat Backend Library
//!
//! This crate provides the scaffolding of a chat backend:
//! - Environment-driven configuration
//! - HTTP server bootstrap with a uniform JSON error contract
//! - A request-validation interceptor
//! - A WebSocket endpoint whose broadcasts fan out across nodes via Redis
//!
//! ## Module Structure
//!
//! ```text
//! chat_backend/
//! +-- config/         Configuration management
//! +-- infrastructure/ Redis connection, pub/sub, metrics
//! +-- presentation/   HTTP routes, middleware, real-time sockets
//! +-- shared/         Error taxonomy and validation schemas
//! ```

// Configuration module
pub mod config;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and socket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;

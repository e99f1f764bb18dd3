//! # Chat Backend
//!
//! Backend scaffold for a chat application.
//!
//! This is the application entry point that initializes:
//! - Configuration loading
//! - Tracing/logging subsystem
//! - Redis pub/sub adapter (when configured)
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use chat_backend::config::Settings;
use chat_backend::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment and config files
    let settings = Settings::load()?;

    // Initialize tracing subscriber for structured logging
    chat_backend::telemetry::init_tracing(settings.log.format);

    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        redis = settings.redis.url.is_some(),
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}

//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::presentation::http::handlers::health;
use crate::presentation::http::routes;
use crate::presentation::middleware::{create_cors_layer, create_trace_layer};
use crate::presentation::realtime::{RedisAdapter, SocketHub};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub hub: Arc<SocketHub>,
    /// Present when Redis is configured
    pub adapter: Option<RedisAdapter>,
}

impl AppState {
    /// State for a single node, without the Redis adapter
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            hub: Arc::new(SocketHub::new()),
            adapter: None,
        }
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    relay: Option<JoinHandle<()>>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let mut state = AppState::new(settings.clone());

        // Connect the socket hub to the cluster when Redis is configured
        let relay = match settings.redis.url.as_deref() {
            Some(url) => {
                let (adapter, relay) =
                    RedisAdapter::connect(url, &settings.redis, state.hub.clone()).await?;
                state.adapter = Some(adapter);
                Some(relay)
            }
            None => {
                tracing::warn!("Redis not configured, socket broadcasts stay on this node");
                None
            }
        };

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(create_trace_layer())
            .layer(create_cors_layer(&settings.cors));

        // Bind to address
        let addr = settings.server.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            relay,
        })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        if let Some(relay) = self.relay {
            relay.abort();
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}

//! Health Check Handlers
//!
//! Provides health check endpoints for Kubernetes-style liveness and readiness probes.
//!
//! # Endpoints
//! - `GET /health` - Basic health check
//! - `GET /health/live` - Liveness probe (is the server running?)
//! - `GET /health/ready` - Readiness probe (can the server accept traffic?)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::time::Instant;

use crate::startup::AppState;

/// Server start time for uptime calculation
static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);
static SERVER_START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Initialize the server start time (call during startup)
pub fn init_server_start() {
    Lazy::force(&SERVER_START);
    Lazy::force(&SERVER_START_TIME);
}

/// Basic health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed health check response
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub checks: HealthChecks,
}

/// Individual service health checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub redis: ServiceHealth,
    pub sockets: SocketHealth,
}

/// Health status for individual services
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Socket hub health
#[derive(Debug, Serialize)]
pub struct SocketHealth {
    pub status: HealthStatus,
    pub active_connections: usize,
    pub cross_node: bool,
}

/// Overall health status
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Simple liveness response
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness probe - checks if the server is running
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// Readiness probe - checks if the server can accept traffic
/// Returns 200 if ready, 503 if a configured dependency is unavailable
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = SERVER_START.elapsed().as_secs();
    let started_at = SERVER_START_TIME.to_rfc3339();

    let redis_health = check_redis(&state).await;

    let sockets = SocketHealth {
        status: HealthStatus::Healthy,
        active_connections: state.hub.socket_count(),
        cross_node: state.adapter.is_some(),
    };

    let overall_status = redis_health.status;

    let response = DetailedHealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: uptime,
        started_at,
        checks: HealthChecks {
            redis: redis_health,
            sockets,
        },
    };

    (status_code_for(overall_status), Json(response))
}

/// Check Redis connectivity and latency
async fn check_redis(state: &AppState) -> ServiceHealth {
    let Some(adapter) = state.adapter.as_ref() else {
        return ServiceHealth {
            status: HealthStatus::Healthy,
            latency_ms: None,
            message: Some("Redis not configured, running single-node".into()),
        };
    };

    let start = Instant::now();
    let ping = adapter
        .ping()
        .await
        .map(|()| start.elapsed().as_millis() as u64)
        .map_err(|e| e.to_string());

    redis_health(ping, adapter.relay_active())
}

/// Combine the ping result with the state of the subscriber relay.
///
/// A reachable Redis is still unhealthy while the relay is resubscribing,
/// since remote broadcasts are not arriving.
fn redis_health(ping: Result<u64, String>, relay_active: bool) -> ServiceHealth {
    match ping {
        Ok(latency) if !relay_active => ServiceHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: Some(latency),
            message: Some("Redis subscription down, cross-node broadcasts paused".into()),
        },
        Ok(latency) => ServiceHealth {
            status: if latency < 50 {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            latency_ms: Some(latency),
            message: None,
        },
        Err(e) => ServiceHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some(format!("Redis connection failed: {}", e)),
        },
    }
}

fn status_code_for(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

use std::collections::BTreeMap;
use std::sync::{Arc, Once};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use health_coach_domain::health::{ComponentStatus, HealthServiceTrait, SystemStatus};

use crate::api::routes::AppState;

/// Service type for dependency injection
pub type HealthService = Arc<dyn HealthServiceTrait>;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Unix timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Per-component status, keyed by component name
    pub components: BTreeMap<String, ComponentHealthStatus>,
    /// Environment information
    pub environment: String,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();
static INIT: Once = Once::new();

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time used for uptime reporting
pub fn initialize_server_start_time() {
    INIT.call_once(|| {
        let _ = SERVER_START_TIME.set(unix_now());
    });
}

fn component_status_label(status: &ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "ok",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "error",
    }
}

/// Health check endpoint to verify the API is running
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy", body = HealthResponse),
        (status = 500, description = "API is not healthy", body = HealthResponse),
        (status = 503, description = "API is degraded", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");

    let now = unix_now();
    let uptime = SERVER_START_TIME.get().map(|&start| now.saturating_sub(start));

    let system_health = state.health_service.get_system_health().await;

    let (status, code) = match system_health.status {
        SystemStatus::Healthy => ("ok", StatusCode::OK),
        SystemStatus::Degraded => ("degraded", StatusCode::SERVICE_UNAVAILABLE),
        SystemStatus::Unhealthy => ("error", StatusCode::INTERNAL_SERVER_ERROR),
    };

    let components = system_health
        .components
        .into_iter()
        .map(|(name, component)| {
            (
                name,
                ComponentHealthStatus {
                    status: component_status_label(&component.status).to_string(),
                    message: component.details,
                },
            )
        })
        .collect();

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components,
        environment: state.environment.to_string(),
    };

    (code, Json(response))
}

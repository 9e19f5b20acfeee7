//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
///
/// Full health status. Degraded when the map key is missing, since the
/// function can only answer 500 until it is configured.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let key_ok = state.map_key().is_some();

    Json(HealthResponse {
        status: if key_ok { "healthy" } else { "degraded" }.to_string(),
        map_key: if key_ok { "ok" } else { "missing" }.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

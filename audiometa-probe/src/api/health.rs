//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Module name ("audiometa-probe")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Admission capacity
    pub probe_capacity: usize,
    /// Probes currently holding an admission slot
    pub probes_in_flight: usize,
}

/// GET /health
///
/// Reads the gate counters without acquiring a slot.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "audiometa-probe".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        probe_capacity: state.gate.capacity(),
        probes_in_flight: state.gate.in_flight(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

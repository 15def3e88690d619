//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// False when the completion service is not configured.
    generator_ready: bool,
}

/// Public health check endpoint.
///
/// Reports ok even when generation is unconfigured, so load balancers keep
/// routing and callers see the configuration error instead of a dead host.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        generator_ready: state.generator.is_ok(),
    })
}

//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

/// Health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Always "healthy" while the process answers.
    pub status: &'static str,
    /// Server version
    pub version: &'static str,
    /// Number of registered tools
    pub tools: usize,
    /// Raster backend in use, or "placeholder"
    pub raster: &'static str,
}

/// `GET /health`
#[tracing::instrument(name = "health_check", skip(state))]
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        tools: state.mcp.registry().list().len(),
        raster: state
            .mcp
            .pipeline()
            .raster_backend_name()
            .unwrap_or("placeholder"),
    })
}

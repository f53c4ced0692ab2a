//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub version: &'static str,
    /// Unix time in seconds.
    pub timestamp: f64,
}

/// `GET /health` — readiness. Never fails; reflects adapter state.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let model_loaded = ctx.service.is_model_loaded();
    let now = chrono::Utc::now();

    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "unavailable" },
        model_loaded,
        version: crate::config::APP_VERSION,
        timestamp: now.timestamp_millis() as f64 / 1000.0,
    })
}

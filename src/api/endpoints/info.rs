//! Root endpoint: service name, version and route listing.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::config::{APP_NAME, APP_VERSION};

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub model_loaded: bool,
    pub endpoints: Vec<&'static str>,
}

/// `GET /`
pub async fn root(State(ctx): State<ApiContext>) -> Json<InfoResponse> {
    let mut endpoints = vec!["/health", "/predict", "/predict/batch"];
    if ctx.config.expose_docs {
        endpoints.push("/docs");
    }

    Json(InfoResponse {
        message: APP_NAME,
        version: APP_VERSION,
        model_loaded: ctx.service.is_model_loaded(),
        endpoints,
    })
}

//! `GET /docs` — machine-readable description of the API.
//!
//! Only mounted when `ServiceConfig::expose_docs` is set.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::api::types::{ApiContext, MAX_BATCH_ITEMS, MAX_TEXT_CHARS, MIN_TEXT_CHARS};
use crate::config::{APP_NAME, APP_VERSION};
use crate::inference::{BatchMode, ECHO_MAX_CHARS};

pub async fn describe(State(ctx): State<ApiContext>) -> Json<Value> {
    let prediction = json!({
        "sentiment": "integer, one of -1 (negative), 0 (neutral), 1 (positive)",
        "probabilities": "object keyed by \"-1\", \"0\", \"1\"; values sum to 1",
        "confidence": "maximum of probabilities",
        "text": format!("input echo, trimmed and truncated to {ECHO_MAX_CHARS} characters"),
    });

    let batch_response = match ctx.config.batch_mode {
        BatchMode::FailFast => json!({
            "predictions": [prediction.clone()],
            "processing_time_ms": "number",
        }),
        BatchMode::Collect => json!({
            "results": [{ "ok": prediction.clone() }, { "error": { "code": "string", "message": "string" } }],
            "processing_time_ms": "number",
            "succeeded": "integer",
            "failed": "integer",
        }),
    };

    Json(json!({
        "title": APP_NAME,
        "version": APP_VERSION,
        "batch_mode": ctx.config.batch_mode,
        "operations": [
            {
                "method": "GET",
                "path": "/health",
                "response": {
                    "status": "\"healthy\" | \"unavailable\"",
                    "model_loaded": "boolean",
                    "version": "string",
                    "timestamp": "number (unix seconds)",
                },
            },
            {
                "method": "POST",
                "path": "/predict",
                "request": {
                    "text": format!("string, {MIN_TEXT_CHARS}-{MAX_TEXT_CHARS} characters"),
                },
                "response": prediction,
            },
            {
                "method": "POST",
                "path": "/predict/batch",
                "request": {
                    "texts": format!(
                        "array of 1-{MAX_BATCH_ITEMS} strings, each {MIN_TEXT_CHARS}-{MAX_TEXT_CHARS} characters"
                    ),
                },
                "response": batch_response,
            },
        ],
        "errors": {
            "VALIDATION_FAILED": 422,
            "EMPTY_INPUT": 422,
            "BAD_REQUEST": 400,
            "MODEL_UNAVAILABLE": 503,
            "INFERENCE_FAILED": 500,
            "TIMEOUT": 504,
            "NOT_FOUND": 404,
        },
    }))
}

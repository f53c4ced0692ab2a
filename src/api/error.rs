//! API error types with structured JSON responses.
//!
//! Client-caused failures (validation, empty input, malformed body) map
//! to 4xx; model failures map to 5xx so callers can tell them apart.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::inference::{BatchFailure, InferenceError};

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Malformed request: {0}")]
    BadRequest(String),
    #[error("{0}")]
    EmptyInput(String),
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Status, stable code and client-facing message for this error.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Validation(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_FAILED",
                detail.clone(),
            ),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::EmptyInput(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_INPUT",
                detail.clone(),
            ),
            ApiError::ModelUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "MODEL_UNAVAILABLE",
                "Sentiment model is not loaded".to_string(),
            ),
            ApiError::InferenceFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INFERENCE_FAILED",
                "Prediction failed".to_string(),
            ),
            ApiError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                "Prediction did not complete in time".to_string(),
            ),
            ApiError::NotFound(path) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("No route for {path}"),
            ),
        }
    }

    pub fn detail(&self) -> ErrorDetail {
        let (_, code, message) = self.parts();
        ErrorDetail { code, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::InferenceFailed(detail) => {
                tracing::error!(detail, "Inference failed");
            }
            ApiError::ModelUnavailable(reason) => {
                tracing::warn!(reason, "Prediction requested without a loaded model");
            }
            _ => {}
        }

        let (status, code, message) = self.parts();
        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::EmptyInput => ApiError::EmptyInput(err.to_string()),
            InferenceError::ModelUnavailable(reason) => ApiError::ModelUnavailable(reason),
            InferenceError::InferenceFailure(detail) => ApiError::InferenceFailed(detail),
        }
    }
}

/// Same kind as the failing item; the message names its position.
impl From<BatchFailure> for ApiError {
    fn from(failure: BatchFailure) -> Self {
        let index = failure.index;
        match ApiError::from(failure.error) {
            ApiError::EmptyInput(msg) => ApiError::EmptyInput(format!("texts[{index}]: {msg}")),
            ApiError::InferenceFailed(detail) => {
                ApiError::InferenceFailed(format!("texts[{index}]: {detail}"))
            }
            other => other,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::Validation(e.body_text()),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

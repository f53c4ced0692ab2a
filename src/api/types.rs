//! Shared state, request bodies and response bodies for the API layer.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ErrorDetail};
use crate::config::ServiceConfig;
use crate::inference::{BatchReport, BatchResult, PredictionRecord, SentimentService};

/// Per-text length bounds, in characters.
pub const MIN_TEXT_CHARS: usize = 1;
pub const MAX_TEXT_CHARS: usize = 5000;

/// Per-request batch size bounds.
pub const MIN_BATCH_ITEMS: usize = 1;
pub const MAX_BATCH_ITEMS: usize = 100;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes. Cloned per request; everything
/// inside is immutable after startup.
#[derive(Clone)]
pub struct ApiContext {
    pub service: SentimentService,
    pub config: Arc<ServiceConfig>,
}

impl ApiContext {
    pub fn new(service: SentimentService, config: Arc<ServiceConfig>) -> Self {
        Self { service, config }
    }
}

// ═══════════════════════════════════════════════════════════
// Requests
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub text: String,
}

impl CommentInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_text("text", &self.text)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchInput {
    pub texts: Vec<String>,
}

impl BatchInput {
    /// Size bounds first, then every item's length bounds.
    pub fn validate(&self) -> Result<(), ApiError> {
        let count = self.texts.len();
        if count < MIN_BATCH_ITEMS {
            return Err(ApiError::Validation(format!(
                "texts must contain at least {MIN_BATCH_ITEMS} item"
            )));
        }
        if count > MAX_BATCH_ITEMS {
            return Err(ApiError::Validation(format!(
                "texts must contain at most {MAX_BATCH_ITEMS} items (got {count})"
            )));
        }
        for (i, text) in self.texts.iter().enumerate() {
            validate_text(&format!("texts[{i}]"), text)?;
        }
        Ok(())
    }
}

fn validate_text(field: &str, text: &str) -> Result<(), ApiError> {
    let len = text.chars().count();
    if len < MIN_TEXT_CHARS {
        return Err(ApiError::Validation(format!(
            "{field} must contain at least {MIN_TEXT_CHARS} character"
        )));
    }
    if len > MAX_TEXT_CHARS {
        return Err(ApiError::Validation(format!(
            "{field} must contain at most {MAX_TEXT_CHARS} characters (got {len})"
        )));
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Responses
// ═══════════════════════════════════════════════════════════

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub predictions: Vec<PredictionRecord>,
    pub processing_time_ms: f64,
}

impl From<BatchResult> for BatchResponse {
    fn from(result: BatchResult) -> Self {
        Self {
            predictions: result.predictions,
            processing_time_ms: millis(result.processing_time),
        }
    }
}

/// One entry of a collect-mode batch: `{"ok": ...}` or `{"error": ...}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemResult {
    Ok(PredictionRecord),
    Error(ErrorDetail),
}

#[derive(Debug, Serialize)]
pub struct CollectedBatchResponse {
    pub results: Vec<ItemResult>,
    pub processing_time_ms: f64,
    pub succeeded: usize,
    pub failed: usize,
}

impl From<BatchReport> for CollectedBatchResponse {
    fn from(report: BatchReport) -> Self {
        let succeeded = report.succeeded();
        let failed = report.failed();
        let results = report
            .outcomes
            .into_iter()
            .map(|outcome| match outcome {
                Ok(record) => ItemResult::Ok(record),
                Err(err) => ItemResult::Error(ApiError::from(err).detail()),
            })
            .collect();
        Self {
            results,
            processing_time_ms: millis(report.processing_time),
            succeeded,
            failed,
        }
    }
}

//! Prediction endpoints.
//!
//! - `POST /predict` — classify one comment
//! - `POST /predict/batch` — classify up to 100 comments in order
//!
//! Structural validation runs on the async side before any inference.
//! Inference itself is CPU-bound and runs on the blocking pool, bounded
//! by the configured request timeout.

use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{
    ApiContext, BatchInput, BatchResponse, CollectedBatchResponse, CommentInput,
};
use crate::inference::{BatchMode, PredictionRecord};

/// Run `work` on the blocking pool with a deadline.
///
/// A panic inside `work` surfaces as `InferenceFailed`.
async fn run_blocking<T, F>(timeout: Duration, work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(work);
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_err)) => Err(ApiError::InferenceFailed(format!(
            "inference task aborted: {join_err}"
        ))),
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Prediction timed out");
            Err(ApiError::Timeout)
        }
    }
}

/// `POST /predict` — classify one comment.
pub async fn single(
    State(ctx): State<ApiContext>,
    payload: Result<Json<CommentInput>, JsonRejection>,
) -> Result<Json<PredictionRecord>, ApiError> {
    let Json(input) = payload?;
    input.validate()?;

    let service = ctx.service.clone();
    let record = run_blocking(ctx.config.request_timeout, move || {
        service.predict(&input.text)
    })
    .await??;

    Ok(Json(record))
}

/// `POST /predict/batch` — classify a batch according to the configured
/// batch mode.
pub async fn batch(
    State(ctx): State<ApiContext>,
    payload: Result<Json<BatchInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(input) = payload?;
    input.validate()?;

    let service = ctx.service.clone();
    let timeout = ctx.config.request_timeout;

    match ctx.config.batch_mode {
        BatchMode::FailFast => {
            let result = run_blocking(timeout, move || {
                service.predict_batch(input.texts.as_slice())
            })
            .await??;
            tracing::debug!(
                items = result.predictions.len(),
                elapsed_ms = result.processing_time.as_millis() as u64,
                "Batch classified"
            );
            Ok(Json(BatchResponse::from(result)).into_response())
        }
        BatchMode::Collect => {
            let report = run_blocking(timeout, move || {
                service.predict_batch_collect(input.texts.as_slice())
            })
            .await??;
            Ok(Json(CollectedBatchResponse::from(report)).into_response())
        }
    }
}

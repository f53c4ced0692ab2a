//! Batch inference.
//!
//! Items run sequentially in input order through `SentimentService::predict`.
//! Two policies:
//! - `FailFast` (default): the first failing item aborts the batch, no
//!   partial predictions are returned.
//! - `Collect`: every item gets its own outcome; only an unavailable
//!   model fails the batch as a whole.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{InferenceError, PredictionRecord, SentimentService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    #[default]
    FailFast,
    Collect,
}

impl FromStr for BatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_fast" | "fail-fast" => Ok(BatchMode::FailFast),
            "collect" => Ok(BatchMode::Collect),
            other => Err(format!("unknown batch mode '{other}'")),
        }
    }
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchMode::FailFast => f.write_str("fail_fast"),
            BatchMode::Collect => f.write_str("collect"),
        }
    }
}

/// Successful fail-fast batch: one record per input, in input order.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub predictions: Vec<PredictionRecord>,
    /// Wall-clock time for the whole batch.
    pub processing_time: Duration,
}

/// The item that aborted a fail-fast batch.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("batch item {index}: {error}")]
pub struct BatchFailure {
    pub index: usize,
    pub error: InferenceError,
}

pub type ItemOutcome = Result<PredictionRecord, InferenceError>;

/// Collect-mode batch: one outcome per input, in input order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
    pub processing_time: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

impl SentimentService {
    /// Classify every text in order, aborting on the first failure.
    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<BatchResult, BatchFailure> {
        let start = Instant::now();

        let predictions = texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                self.predict(text.as_ref()).map_err(|error| {
                    tracing::warn!(index, %error, size = texts.len(), "Batch aborted");
                    BatchFailure { index, error }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BatchResult {
            predictions,
            processing_time: start.elapsed(),
        })
    }

    /// Classify every text in order, keeping per-item failures.
    ///
    /// An unavailable model is checked once up front and fails the call.
    pub fn predict_batch_collect<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<BatchReport, InferenceError> {
        if let Some(reason) = self.adapter().unavailable_reason() {
            return Err(InferenceError::ModelUnavailable(reason.to_string()));
        }

        let start = Instant::now();
        let outcomes: Vec<ItemOutcome> = texts.iter().map(|t| self.predict(t.as_ref())).collect();

        let report = BatchReport {
            outcomes,
            processing_time: start.elapsed(),
        };
        if report.failed() > 0 {
            tracing::debug!(
                failed = report.failed(),
                size = texts.len(),
                "Batch completed with item failures"
            );
        }
        Ok(report)
    }
}

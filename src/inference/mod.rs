//! Single-item and batch inference over a `PredictorAdapter`.
//!
//! Everything here is request-scoped and synchronous. The only shared
//! object is the adapter, which is read-only after startup.

pub mod batch;
pub mod single;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::predictor::{PredictorError, SentimentLabel};

pub use batch::{BatchFailure, BatchMode, BatchReport, BatchResult, ItemOutcome};
pub use single::SentimentService;

/// Maximum characters of the input echoed back in a prediction record.
pub const ECHO_MAX_CHARS: usize = 200;

const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("Text is empty after trimming")]
    EmptyInput,

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Inference failed: {0}")]
    InferenceFailure(String),
}

impl InferenceError {
    /// `true` for failures caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, InferenceError::EmptyInput)
    }
}

impl From<PredictorError> for InferenceError {
    fn from(err: PredictorError) -> Self {
        match err {
            PredictorError::ModelUnavailable(reason) => InferenceError::ModelUnavailable(reason),
            PredictorError::InferenceFailure(detail) => InferenceError::InferenceFailure(detail),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Prediction record
// ═══════════════════════════════════════════════════════════

/// Per-class probabilities, kept in the predictor's class order.
/// Serialized as a JSON object keyed by label ("-1", "0", "1").
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities(Vec<(SentimentLabel, f64)>);

impl ClassProbabilities {
    /// Pair each class with the probability at the same position.
    ///
    /// Fails when the lengths differ or a value is not a probability.
    pub fn zip(classes: &[SentimentLabel], probabilities: &[f64]) -> Result<Self, InferenceError> {
        if classes.len() != probabilities.len() {
            return Err(InferenceError::InferenceFailure(format!(
                "probability vector has {} entries for {} classes",
                probabilities.len(),
                classes.len()
            )));
        }
        if let Some(bad) = probabilities
            .iter()
            .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
        {
            return Err(InferenceError::InferenceFailure(format!(
                "probability {bad} outside [0, 1]"
            )));
        }
        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(InferenceError::InferenceFailure(format!(
                "probabilities sum to {sum}"
            )));
        }
        Ok(Self(
            classes.iter().copied().zip(probabilities.iter().copied()).collect(),
        ))
    }

    pub fn get(&self, label: SentimentLabel) -> Option<f64> {
        self.0.iter().find(|(l, _)| *l == label).map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SentimentLabel, f64)> + '_ {
        self.0.iter().copied()
    }

    /// The most probable class and its probability.
    pub fn max(&self) -> Option<(SentimentLabel, f64)> {
        self.iter().max_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().map(|(_, p)| p).sum()
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, p) in &self.0 {
            map.serialize_entry(label.key(), p)?;
        }
        map.end()
    }
}

/// One classified comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub sentiment: SentimentLabel,
    pub probabilities: ClassProbabilities,
    pub confidence: f64,
    pub text: String,
}

/// First `max_chars` characters of `text`, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

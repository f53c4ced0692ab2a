//! Predictor adapter: the boundary object around the trained pipeline.
//!
//! The serving layer never talks to a model directly. It goes through
//! `PredictorAdapter`, which is either `Ready` (wrapping a loaded
//! `SentimentPredictor`) or `Unavailable` (the artifact failed to load
//! at startup). The adapter also exposes the model's authoritative class
//! ordering so probability vectors can be mapped back to labels.

pub mod linear;
pub mod mock;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use thiserror::Error;

pub use linear::LinearPipeline;
pub use mock::MockPredictor;

// ═══════════════════════════════════════════════════════════
// Labels
// ═══════════════════════════════════════════════════════════

/// Three-valued sentiment outcome. Serialized as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
    ];

    pub fn value(self) -> i8 {
        match self {
            SentimentLabel::Negative => -1,
            SentimentLabel::Neutral => 0,
            SentimentLabel::Positive => 1,
        }
    }

    /// Stable key used in probability maps ("-1", "0", "1").
    pub fn key(self) -> &'static str {
        match self {
            SentimentLabel::Negative => "-1",
            SentimentLabel::Neutral => "0",
            SentimentLabel::Positive => "1",
        }
    }
}

impl TryFrom<i64> for SentimentLabel {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(SentimentLabel::Negative),
            0 => Ok(SentimentLabel::Neutral),
            1 => Ok(SentimentLabel::Positive),
            other => Err(other),
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for SentimentLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.value())
    }
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// Failures while loading a model artifact from disk.
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("Model artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),
}

/// Failures surfaced by `classify`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictorError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Inference failed: {0}")]
    InferenceFailure(String),
}

// ═══════════════════════════════════════════════════════════
// Predictor trait
// ═══════════════════════════════════════════════════════════

/// Raw classifier output: a label plus one probability per class,
/// positioned according to `SentimentPredictor::classes`.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: SentimentLabel,
    pub probabilities: Vec<f64>,
}

/// A loaded, immutable text classifier.
///
/// `classify` must not mutate model state and must be safe to call from
/// many threads at once.
pub trait SentimentPredictor: Send + Sync {
    /// Class ordering of the probability vector returned by `classify`.
    fn classes(&self) -> &[SentimentLabel];

    fn classify(&self, text: &str) -> Result<Classification, PredictorError>;
}

// ═══════════════════════════════════════════════════════════
// Adapter
// ═══════════════════════════════════════════════════════════

enum AdapterState {
    Ready(Arc<dyn SentimentPredictor>),
    Unavailable { reason: String },
}

/// Owner of the process-wide model. Constructed once at startup and
/// shared read-only (behind `Arc`) by every request.
pub struct PredictorAdapter {
    state: AdapterState,
}

impl PredictorAdapter {
    pub fn ready(predictor: Arc<dyn SentimentPredictor>) -> Self {
        Self {
            state: AdapterState::Ready(predictor),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: AdapterState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    /// Load the JSON pipeline artifact at `path`.
    ///
    /// Never fails: a load error yields an `Unavailable` adapter so the
    /// service can still start and report the condition via health.
    pub fn load(path: &Path) -> Self {
        match LinearPipeline::from_file(path) {
            Ok(pipeline) => {
                tracing::info!(
                    path = %path.display(),
                    classes = ?pipeline.classes(),
                    vocabulary = pipeline.vocabulary_size(),
                    "Sentiment model loaded"
                );
                Self::ready(Arc::new(pipeline))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Sentiment model failed to load");
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, AdapterState::Ready(_))
    }

    /// Why the model is unavailable, if it is.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            AdapterState::Ready(_) => None,
            AdapterState::Unavailable { reason } => Some(reason),
        }
    }

    /// Authoritative class ordering, `None` when no model is loaded.
    pub fn classes(&self) -> Option<&[SentimentLabel]> {
        match &self.state {
            AdapterState::Ready(predictor) => Some(predictor.classes()),
            AdapterState::Unavailable { .. } => None,
        }
    }

    /// Classify already-trimmed, non-empty text.
    pub fn classify(&self, text: &str) -> Result<Classification, PredictorError> {
        match &self.state {
            AdapterState::Ready(predictor) => predictor.classify(text),
            AdapterState::Unavailable { reason } => {
                Err(PredictorError::ModelUnavailable(reason.clone()))
            }
        }
    }
}

impl fmt::Debug for PredictorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            AdapterState::Ready(predictor) => f
                .debug_struct("PredictorAdapter")
                .field("classes", &predictor.classes())
                .finish(),
            AdapterState::Unavailable { reason } => f
                .debug_struct("PredictorAdapter")
                .field("unavailable", reason)
                .finish(),
        }
    }
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{truncate_chars, ClassProbabilities, InferenceError, PredictionRecord, ECHO_MAX_CHARS};
use crate::predictor::PredictorAdapter;

/// Prediction service shared by every request. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SentimentService {
    adapter: Arc<PredictorAdapter>,
}

impl SentimentService {
    pub fn new(adapter: Arc<PredictorAdapter>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &PredictorAdapter {
        &self.adapter
    }

    pub fn is_model_loaded(&self) -> bool {
        self.adapter.is_loaded()
    }

    /// Classify one comment.
    ///
    /// The text is trimmed before inference; the echoed copy in the
    /// record is additionally capped at `ECHO_MAX_CHARS`.
    pub fn predict(&self, text: &str) -> Result<PredictionRecord, InferenceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InferenceError::EmptyInput);
        }

        let classification = self.adapter.classify(text)?;
        let classes = self.adapter.classes().ok_or_else(|| {
            InferenceError::ModelUnavailable("class ordering not available".into())
        })?;

        let probabilities = ClassProbabilities::zip(classes, &classification.probabilities)?;
        let (_, confidence) = probabilities
            .max()
            .ok_or_else(|| InferenceError::InferenceFailure("no class probabilities".into()))?;

        // Ties go to the predictor's own label.
        let label = classification.label;
        match probabilities.get(label) {
            None => {
                return Err(InferenceError::InferenceFailure(format!(
                    "predicted label {label} is not in the class list"
                )))
            }
            Some(p) if p < confidence => {
                return Err(InferenceError::InferenceFailure(format!(
                    "predicted label {label} has probability {p}, below the maximum {confidence}"
                )))
            }
            Some(_) => {}
        }

        Ok(PredictionRecord {
            sentiment: label,
            probabilities,
            confidence,
            text: truncate_chars(text, ECHO_MAX_CHARS).to_string(),
        })
    }

    /// `predict` plus the elapsed time of the call.
    pub fn predict_timed(
        &self,
        text: &str,
    ) -> Result<(PredictionRecord, Duration), InferenceError> {
        let start = Instant::now();
        let record = self.predict(text)?;
        Ok((record, start.elapsed()))
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{Classification, PredictorError, SentimentLabel, SentimentPredictor};

const POSITIVE_WORDS: &[&str] = &["love", "great", "best", "helpful", "awesome"];
const NEGATIVE_WORDS: &[&str] = &["hate", "boring", "terrible", "awful", "waste"];

/// Mock predictor for testing: keyword-driven, deterministic, and
/// instrumented so tests can assert whether (and with what) it was called.
///
/// Class ordering is configurable to exercise label/position mapping.
pub struct MockPredictor {
    classes: Vec<SentimentLabel>,
    fail_marker: Option<String>,
    malformed: bool,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl MockPredictor {
    pub fn new() -> Self {
        Self::with_classes(SentimentLabel::ALL.to_vec())
    }

    pub fn with_classes(classes: Vec<SentimentLabel>) -> Self {
        Self {
            classes,
            fail_marker: None,
            malformed: false,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Fail with `InferenceFailure` on any text containing `marker`.
    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_marker = Some(marker.into());
        self
    }

    /// Return a probability vector one entry short of the class list.
    pub fn malformed(mut self) -> Self {
        self.malformed = true;
        self
    }

    /// Number of `classify` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts passed to `classify`, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn distribution(text: &str) -> (SentimentLabel, [f64; 3]) {
        let lower = text.to_lowercase();
        let pos = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
        let neg = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();

        // [negative, neutral, positive]
        if pos > neg {
            (SentimentLabel::Positive, [0.1, 0.2, 0.7])
        } else if neg > pos {
            (SentimentLabel::Negative, [0.75, 0.15, 0.1])
        } else {
            (SentimentLabel::Neutral, [0.2, 0.6, 0.2])
        }
    }
}

impl Default for MockPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentPredictor for MockPredictor {
    fn classes(&self) -> &[SentimentLabel] {
        &self.classes
    }

    fn classify(&self, text: &str) -> Result<Classification, PredictorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(text.to_string());
        }

        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(PredictorError::InferenceFailure(format!(
                    "mock failure on '{marker}'"
                )));
            }
        }

        let (label, by_label) = Self::distribution(text);
        let mut probabilities: Vec<f64> = self
            .classes
            .iter()
            .map(|class| match class {
                SentimentLabel::Negative => by_label[0],
                SentimentLabel::Neutral => by_label[1],
                SentimentLabel::Positive => by_label[2],
            })
            .collect();

        if self.malformed {
            probabilities.pop();
        }

        Ok(Classification {
            label,
            probabilities,
        })
    }
}

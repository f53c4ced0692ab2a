//! Linear TF-IDF + multinomial logistic-regression pipeline.
//!
//! Loads a JSON export of a fitted word-level vectorizer and linear
//! classifier:
//!
//! ```json
//! {
//!   "classes": [-1, 0, 1],
//!   "vocabulary": { "love": 0, "boring": 1 },
//!   "idf": [1.7, 2.1],
//!   "coef": [[-1.2, 2.0], [0.1, 0.3], [2.4, -1.9]],
//!   "intercept": [0.0, 0.2, -0.1],
//!   "lowercase": true,
//!   "ngram_range": [1, 2],
//!   "sublinear_tf": false
//! }
//! ```
//!
//! `classes` fixes the row order of `coef`/`intercept` and therefore the
//! position order of every probability vector this pipeline returns.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::{Classification, ModelLoadError, PredictorError, SentimentLabel, SentimentPredictor};

/// Word tokens of two or more word characters.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?u)\b\w\w+\b").expect("valid regex"));

fn default_lowercase() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

#[derive(Debug, Deserialize)]
struct PipelineArtifact {
    classes: Vec<i64>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    sublinear_tf: bool,
}

/// A fitted text classification pipeline, immutable after load.
#[derive(Debug)]
pub struct LinearPipeline {
    classes: Vec<SentimentLabel>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    lowercase: bool,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
}

impl LinearPipeline {
    pub fn from_file(path: &Path) -> Result<Self, ModelLoadError> {
        if !path.exists() {
            return Err(ModelLoadError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ModelLoadError> {
        let artifact: PipelineArtifact = serde_json::from_str(raw)?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: PipelineArtifact) -> Result<Self, ModelLoadError> {
        let invalid = |msg: String| Err(ModelLoadError::InvalidArtifact(msg));

        let mut classes = Vec::with_capacity(artifact.classes.len());
        let mut unique = HashSet::new();
        for raw in &artifact.classes {
            let label = SentimentLabel::try_from(*raw)
                .map_err(|v| ModelLoadError::InvalidArtifact(format!("unknown class label {v}")))?;
            if !unique.insert(label) {
                return invalid(format!("duplicate class label {label}"));
            }
            classes.push(label);
        }
        if classes.len() != SentimentLabel::ALL.len() {
            return invalid(format!(
                "expected classes -1, 0 and 1, got {:?}",
                artifact.classes
            ));
        }

        let n_features = artifact.idf.len();
        if artifact.coef.len() != classes.len() {
            return invalid(format!(
                "coef has {} rows for {} classes",
                artifact.coef.len(),
                classes.len()
            ));
        }
        if let Some((row, len)) = artifact
            .coef
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != n_features)
        {
            return invalid(format!(
                "coef row {row} has {len} weights, expected {n_features}"
            ));
        }
        if artifact.intercept.len() != classes.len() {
            return invalid(format!(
                "intercept has {} entries for {} classes",
                artifact.intercept.len(),
                classes.len()
            ));
        }
        if let Some((term, idx)) = artifact
            .vocabulary
            .iter()
            .find(|(_, idx)| **idx >= n_features)
        {
            return invalid(format!(
                "vocabulary term '{term}' maps to feature {idx}, only {n_features} features"
            ));
        }
        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return invalid(format!("invalid ngram_range ({min_n}, {max_n})"));
        }

        Ok(Self {
            classes,
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            coef: artifact.coef,
            intercept: artifact.intercept,
            lowercase: artifact.lowercase,
            ngram_range: artifact.ngram_range,
            sublinear_tf: artifact.sublinear_tf,
        })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    fn terms(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens: Vec<&str> = TOKEN_PATTERN.find_iter(&text).map(|m| m.as_str()).collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }

    /// Sparse, L2-normalized TF-IDF features as `(feature index, weight)`.
    fn transform(&self, text: &str) -> Vec<(usize, f64)> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.terms(text) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut features: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (idx, tf * self.idf[idx])
            })
            .collect();

        let norm = features.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut features {
                *w /= norm;
            }
        }
        features
    }
}

/// Numerically stable softmax.
fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

impl SentimentPredictor for LinearPipeline {
    fn classes(&self) -> &[SentimentLabel] {
        &self.classes
    }

    fn classify(&self, text: &str) -> Result<Classification, PredictorError> {
        let features = self.transform(text);

        let scores: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, bias)| bias + features.iter().map(|(idx, w)| row[*idx] * w).sum::<f64>())
            .collect();

        if scores.iter().any(|s| !s.is_finite()) {
            return Err(PredictorError::InferenceFailure(
                "non-finite decision score".into(),
            ));
        }

        let probabilities = softmax(&scores);
        let best = probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
            .ok_or_else(|| PredictorError::InferenceFailure("empty score vector".into()))?;

        Ok(Classification {
            label: self.classes[best],
            probabilities,
        })
    }
}

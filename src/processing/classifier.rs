//! Learned per-token skill classifier
//!
//! Each whitespace token becomes a [`TokenFeatures`] record. A trained binary
//! [`TokenClassifier`] labels tokens as skill / not skill. The bundled
//! implementation is a sparse linear model exported to JSON: categorical
//! features are one-hot encoded as `name=value`, booleans and numbers are
//! used as-is under their own name.

use crate::error::{Result, ScreenerError};
use crate::models::ModelProvider;
use crate::processing::skills::{ExtractionOutcome, SkillSet, SkillStrategy};
use ndarray::Array1;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Fixed-shape feature record for one token
#[derive(Debug, Clone, PartialEq)]
pub struct TokenFeatures {
    pub word: String,
    pub is_upper: bool,
    pub is_title: bool,
    pub is_digit: bool,
    pub len: usize,
    pub prefix2: String,
    pub suffix2: String,
}

impl TokenFeatures {
    pub fn from_token(token: &str) -> Self {
        let chars: Vec<char> = token.chars().collect();
        let prefix2: String = chars.iter().take(2).collect();
        let suffix2: String = chars[chars.len().saturating_sub(2)..].iter().collect();

        Self {
            word: token.to_lowercase(),
            is_upper: is_upper(token),
            is_title: is_title(token),
            is_digit: !token.is_empty() && token.chars().all(|c| c.is_numeric()),
            len: chars.len(),
            prefix2,
            suffix2,
        }
    }

    /// Active `(feature name, value)` pairs, zero-valued features omitted
    pub fn encode(&self) -> Vec<(String, f32)> {
        let mut encoded = vec![
            (format!("word={}", self.word), 1.0),
            (format!("prefix-2={}", self.prefix2), 1.0),
            (format!("suffix-2={}", self.suffix2), 1.0),
            ("len".to_string(), self.len as f32),
        ];
        for (name, flag) in [
            ("is_upper", self.is_upper),
            ("is_title", self.is_title),
            ("is_digit", self.is_digit),
        ] {
            if flag {
                encoded.push((name.to_string(), 1.0));
            }
        }
        encoded
    }
}

/// Has cased characters and all of them are uppercase
fn is_upper(token: &str) -> bool {
    let mut cased = false;
    for c in token.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Every cased run starts with an uppercase letter followed by lowercase ones
fn is_title(token: &str) -> bool {
    let mut cased = false;
    let mut previous_cased = false;
    for c in token.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else {
            previous_cased = false;
        }
    }
    cased
}

pub trait TokenClassifier: Send + Sync {
    /// One label per feature record, `true` meaning skill
    fn predict(&self, features: &[TokenFeatures]) -> Result<Vec<bool>>;
}

#[derive(Debug, Deserialize)]
struct LinearModelFile {
    feature_index: HashMap<String, usize>,
    coefficients: Vec<f32>,
    intercept: f32,
    #[serde(default)]
    threshold: f32,
}

/// Sparse linear classifier: `intercept + Σ w·x > threshold` means skill
pub struct LinearSkillClassifier {
    feature_index: HashMap<String, usize>,
    coefficients: Array1<f32>,
    intercept: f32,
    threshold: f32,
}

impl LinearSkillClassifier {
    pub fn new(
        feature_index: HashMap<String, usize>,
        coefficients: Vec<f32>,
        intercept: f32,
        threshold: f32,
    ) -> Result<Self> {
        if let Some((name, &idx)) = feature_index.iter().find(|&(_, &idx)| idx >= coefficients.len()) {
            return Err(ScreenerError::ModelError(format!(
                "Feature '{}' maps to index {} but only {} coefficients exist",
                name,
                idx,
                coefficients.len()
            )));
        }

        Ok(Self {
            feature_index,
            coefficients: Array1::from(coefficients),
            intercept,
            threshold,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScreenerError::ModelUnavailable(format!(
                "Classifier file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let model: LinearModelFile = serde_json::from_str(&content)?;
        Self::new(model.feature_index, model.coefficients, model.intercept, model.threshold)
    }

    fn decision(&self, features: &TokenFeatures) -> f32 {
        features
            .encode()
            .iter()
            .filter_map(|(name, value)| self.feature_index.get(name).map(|&idx| self.coefficients[idx] * value))
            .sum::<f32>()
            + self.intercept
    }
}

impl TokenClassifier for LinearSkillClassifier {
    fn predict(&self, features: &[TokenFeatures]) -> Result<Vec<bool>> {
        Ok(features.iter().map(|f| self.decision(f) > self.threshold).collect())
    }
}

pub struct ClassifierStrategy {
    provider: ModelProvider<dyn TokenClassifier>,
}

impl ClassifierStrategy {
    pub fn new(provider: ModelProvider<dyn TokenClassifier>) -> Self {
        Self { provider }
    }

    /// Lazily load the JSON model at `path` on first use
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self::new(ModelProvider::lazy("skill-classifier", move || {
            let classifier: Arc<dyn TokenClassifier> = Arc::new(LinearSkillClassifier::from_file(&path)?);
            Ok(classifier)
        }))
    }

    pub fn disabled() -> Self {
        Self::new(ModelProvider::disabled("skill-classifier"))
    }
}

impl SkillStrategy for ClassifierStrategy {
    fn name(&self) -> &'static str {
        "classifier"
    }

    fn extract(&self, text: &str) -> ExtractionOutcome {
        let Some(classifier) = self.provider.get() else {
            return ExtractionOutcome::Unavailable;
        };

        let tokens: Vec<&str> = text.split_whitespace().collect();
        let features: Vec<TokenFeatures> = tokens.iter().map(|t| TokenFeatures::from_token(t)).collect();

        let labels = match classifier.predict(&features) {
            Ok(labels) => labels,
            Err(e) => return ExtractionOutcome::Failed(e.to_string()),
        };
        if labels.len() != tokens.len() {
            return ExtractionOutcome::Failed(format!(
                "classifier returned {} labels for {} tokens",
                labels.len(),
                tokens.len()
            ));
        }

        let mut skills = SkillSet::new();
        for (token, is_skill) in tokens.iter().zip(labels) {
            if !is_skill {
                continue;
            }
            let cleaned = token.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_'));
            if cleaned.chars().count() > 1 {
                skills.insert(cleaned);
            }
        }

        ExtractionOutcome::Available(skills)
    }
}

//! Resume category prediction (e.g. "Data Science", "HR")
//!
//! A pre-trained multinomial naive Bayes model over TF-IDF term weights,
//! exported to JSON. Text is normalised with [`clean_resume`] before
//! prediction, the same way the training corpus was cleaned. Without a model
//! the category is simply unknown.

use crate::error::{Result, ScreenerError};
use crate::models::ModelProvider;
use log::warn;
use ndarray::{Array1, Array2};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+\s*").expect("Invalid URL regex"));
static RETWEET_CC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"RT|cc").expect("Invalid RT regex"));
static HASHTAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\S+").expect("Invalid hashtag regex"));
static MENTION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\S+").expect("Invalid mention regex"));
static PUNCTUATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[[:punct:]]").expect("Invalid punctuation regex"));
static NON_ASCII_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\x00-\x7f]").expect("Invalid non-ASCII regex"));
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));
static TERM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("Invalid term regex"));

/// Normalise resume text for the category model.
///
/// Drops URLs, hashtags and mentions, replaces "RT" / "cc", ASCII
/// punctuation and non-ASCII characters with spaces, collapses whitespace
/// and lowercases. The "RT" / "cc" replacement also applies inside words;
/// the model was trained on text cleaned that way.
pub fn clean_resume(text: &str) -> String {
    let clean = URL_REGEX.replace_all(text, " ");
    let clean = RETWEET_CC_REGEX.replace_all(&clean, " ");
    let clean = HASHTAG_REGEX.replace_all(&clean, "");
    let clean = MENTION_REGEX.replace_all(&clean, "  ");
    let clean = PUNCTUATION_REGEX.replace_all(&clean, " ");
    let clean = NON_ASCII_REGEX.replace_all(&clean, " ");
    let clean = WHITESPACE_REGEX.replace_all(&clean, " ");
    clean.to_lowercase()
}

pub trait CategoryClassifier: Send + Sync {
    /// Category label for text already passed through [`clean_resume`]
    fn predict(&self, cleaned_text: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct NaiveBayesModelFile {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    classes: Vec<String>,
    class_log_prior: Vec<f32>,
    feature_log_prob: Vec<Vec<f32>>,
}

/// Multinomial naive Bayes over l2-normalised TF-IDF vectors
pub struct NaiveBayesCategoryModel {
    vocabulary: HashMap<String, usize>,
    idf: Array1<f32>,
    classes: Vec<String>,
    class_log_prior: Array1<f32>,
    feature_log_prob: Array2<f32>,
}

impl NaiveBayesCategoryModel {
    pub fn new(
        vocabulary: HashMap<String, usize>,
        idf: Vec<f32>,
        classes: Vec<String>,
        class_log_prior: Vec<f32>,
        feature_log_prob: Vec<Vec<f32>>,
    ) -> Result<Self> {
        let n_features = idf.len();
        if classes.is_empty() {
            return Err(ScreenerError::ModelError("Category model has no classes".to_string()));
        }
        if class_log_prior.len() != classes.len() || feature_log_prob.len() != classes.len() {
            return Err(ScreenerError::ModelError(format!(
                "Category model has {} classes but {} priors and {} likelihood rows",
                classes.len(),
                class_log_prior.len(),
                feature_log_prob.len()
            )));
        }
        if let Some(row) = feature_log_prob.iter().find(|row| row.len() != n_features) {
            return Err(ScreenerError::ModelError(format!(
                "Likelihood row has {} features, expected {}",
                row.len(),
                n_features
            )));
        }
        if let Some((term, &idx)) = vocabulary.iter().find(|&(_, &idx)| idx >= n_features) {
            return Err(ScreenerError::ModelError(format!(
                "Term '{}' maps to index {} but only {} features exist",
                term, idx, n_features
            )));
        }

        let flat: Vec<f32> = feature_log_prob.into_iter().flatten().collect();
        let feature_log_prob = Array2::from_shape_vec((classes.len(), n_features), flat)
            .map_err(|e| ScreenerError::ModelError(e.to_string()))?;

        Ok(Self {
            vocabulary,
            idf: Array1::from(idf),
            classes,
            class_log_prior: Array1::from(class_log_prior),
            feature_log_prob,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScreenerError::ModelUnavailable(format!(
                "Category model not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let model: NaiveBayesModelFile = serde_json::from_str(&content)?;
        Self::new(
            model.vocabulary,
            model.idf,
            model.classes,
            model.class_log_prior,
            model.feature_log_prob,
        )
    }

    fn tfidf(&self, cleaned_text: &str) -> Array1<f32> {
        let mut weights = Array1::<f32>::zeros(self.idf.len());
        for term in TERM_REGEX.find_iter(cleaned_text) {
            if let Some(&idx) = self.vocabulary.get(term.as_str()) {
                weights[idx] += 1.0;
            }
        }
        weights *= &self.idf;

        let norm = weights.dot(&weights).sqrt();
        if norm > 0.0 {
            weights /= norm;
        }
        weights
    }
}

impl CategoryClassifier for NaiveBayesCategoryModel {
    fn predict(&self, cleaned_text: &str) -> Result<String> {
        let joint_log_likelihood = self.feature_log_prob.dot(&self.tfidf(cleaned_text)) + &self.class_log_prior;

        // first maximum wins, so ties resolve to the earlier class
        let best = joint_log_likelihood
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (idx, &score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((idx, score)),
            })
            .map(|(idx, _)| idx)
            .ok_or_else(|| ScreenerError::ModelError("Category model produced no scores".to_string()))?;

        Ok(self.classes[best].clone())
    }
}

pub struct CategoryPredictor {
    provider: ModelProvider<dyn CategoryClassifier>,
}

impl CategoryPredictor {
    pub fn new(provider: ModelProvider<dyn CategoryClassifier>) -> Self {
        Self { provider }
    }

    /// Lazily load the JSON model at `path` on first use
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self::new(ModelProvider::lazy("category-model", move || {
            let model: Arc<dyn CategoryClassifier> = Arc::new(NaiveBayesCategoryModel::from_file(&path)?);
            Ok(model)
        }))
    }

    pub fn disabled() -> Self {
        Self::new(ModelProvider::disabled("category-model"))
    }

    pub fn is_available(&self) -> bool {
        self.provider.get().is_some()
    }

    /// Predicted category, or `None` when no model is loaded or prediction fails
    pub fn predict(&self, text: &str) -> Option<String> {
        let model = self.provider.get()?;
        match model.predict(&clean_resume(text)) {
            Ok(category) => Some(category),
            Err(e) => {
                warn!("Category prediction failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_resume() {
        let cleaned = clean_resume("Skills: Python, SQL!  See https://github.com/jane  #opentowork @jane_doe Café");
        assert_eq!(cleaned, "skills python sql see caf ");
    }

    #[test]
    fn test_clean_resume_strips_rt_and_cc_everywhere() {
        assert_eq!(clean_resume("RT accounting"), " a ounting");
    }

    fn two_class_model() -> NaiveBayesCategoryModel {
        let vocabulary: HashMap<String, usize> =
            [("python".to_string(), 0), ("pandas".to_string(), 1), ("payroll".to_string(), 2)]
                .into_iter()
                .collect();
        NaiveBayesCategoryModel::new(
            vocabulary,
            vec![1.0, 1.5, 1.2],
            vec!["Data Science".to_string(), "HR".to_string()],
            vec![-0.7, -0.7],
            vec![vec![-0.5, -0.6, -4.0], vec![-4.0, -4.0, -0.3]],
        )
        .unwrap()
    }

    #[test]
    fn test_predicts_category() {
        let model = two_class_model();
        assert_eq!(model.predict("python pandas modelling").unwrap(), "Data Science");
        assert_eq!(model.predict("payroll and onboarding").unwrap(), "HR");
        // no known terms: priors decide, earlier class on a tie
        assert_eq!(model.predict("").unwrap(), "Data Science");
    }

    #[test]
    fn test_predictor_cleans_before_predicting() {
        let predictor = CategoryPredictor::new(ModelProvider::ready(
            "test",
            Arc::new(two_class_model()) as Arc<dyn CategoryClassifier>,
        ));
        assert_eq!(predictor.predict("PAYROLL, Payroll!").as_deref(), Some("HR"));
    }

    #[test]
    fn test_missing_model_yields_no_category() {
        let temp_dir = TempDir::new().unwrap();
        let predictor = CategoryPredictor::from_path(temp_dir.path().join("category-model.json"));
        assert_eq!(predictor.predict("python pandas"), None);
        assert!(!predictor.is_available());
        assert_eq!(CategoryPredictor::disabled().predict("python"), None);
    }

    #[test]
    fn test_model_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("category-model.json");
        std::fs::write(
            &path,
            r#"{"vocabulary": {"kubernetes": 0, "recipes": 1},
                "idf": [1.0, 1.0],
                "classes": ["DevOps Engineer", "Chef"],
                "class_log_prior": [-0.69, -0.69],
                "feature_log_prob": [[-0.1, -3.0], [-3.0, -0.1]]}"#,
        )
        .unwrap();

        let predictor = CategoryPredictor::from_path(&path);
        assert_eq!(predictor.predict("Kubernetes operator").as_deref(), Some("DevOps Engineer"));
        assert_eq!(predictor.predict("Seasonal recipes").as_deref(), Some("Chef"));
    }

    #[test]
    fn test_inconsistent_shapes_rejected() {
        let vocabulary: HashMap<String, usize> = [("x".to_string(), 5)].into_iter().collect();
        assert!(NaiveBayesCategoryModel::new(
            vocabulary,
            vec![1.0],
            vec!["A".to_string()],
            vec![0.0],
            vec![vec![0.0]]
        )
        .is_err());
        assert!(NaiveBayesCategoryModel::new(HashMap::new(), vec![1.0], vec![], vec![], vec![]).is_err());
    }
}

//! Sentence embeddings and semantic similarity scoring

use crate::error::{Result, ScreenerError};
use crate::models::ModelProvider;
use log::{info, warn};
use model2vec_rs::model::StaticModel;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Maps text to a fixed-length dense vector
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Model2Vec static embeddings
pub struct Model2VecEmbedder {
    model: StaticModel,
}

impl Model2VecEmbedder {
    /// Load from a local model folder or a Hugging Face repo id
    pub fn load(model_path: &Path) -> Result<Self> {
        let start_time = Instant::now();

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )?;

        info!(
            "Embedding model {} loaded in {:.2?}",
            model_path.display(),
            start_time.elapsed()
        );
        Ok(Self { model })
    }
}

impl Embedder for Model2VecEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.model.encode_single(text);
        if embedding.is_empty() {
            return Err(ScreenerError::Embedding("model produced an empty vector".to_string()));
        }
        Ok(embedding)
    }
}

/// Cosine of the angle between `a` and `b`; zero when either has no magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ScreenerError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot_product / (norm_a * norm_b))
}

/// Cosine similarity as a percentage rounded to two decimals; negatives are kept
pub fn to_percentage(cosine: f32) -> f32 {
    (cosine * 100.0 * 100.0).round() / 100.0
}

pub struct SimilarityScorer {
    provider: ModelProvider<dyn Embedder>,
}

impl SimilarityScorer {
    pub fn new(provider: ModelProvider<dyn Embedder>) -> Self {
        Self { provider }
    }

    /// Lazily load a Model2Vec model on first use
    pub fn from_model_path(model_path: impl AsRef<Path>) -> Self {
        let model_path = model_path.as_ref().to_path_buf();
        Self::new(ModelProvider::lazy("embedding", move || {
            let embedder: Arc<dyn Embedder> = Arc::new(Model2VecEmbedder::load(&model_path)?);
            Ok(embedder)
        }))
    }

    pub fn is_available(&self) -> bool {
        self.provider.get().is_some()
    }

    /// Relevance of `candidate_text` to `job_text`, nominally in [-100, 100].
    ///
    /// Returns 0.0 with a warning when the embedding model is unavailable or
    /// fails on either text.
    pub fn score(&self, candidate_text: &str, job_text: &str) -> f32 {
        match self.try_score(candidate_text, job_text) {
            Ok(score) => score,
            Err(e) => {
                warn!("Similarity defaulted to 0.0: {}", e);
                0.0
            }
        }
    }

    /// Like [`score`](Self::score) but reports why a score could not be computed
    pub fn try_score(&self, candidate_text: &str, job_text: &str) -> Result<f32> {
        let embedder = self.provider.get().ok_or_else(|| {
            ScreenerError::ModelUnavailable(format!("'{}' model not loaded", self.provider.name()))
        })?;

        let job_vector = embedder.embed(job_text)?;
        let candidate_vector = embedder.embed(candidate_text)?;
        let cosine = cosine_similarity(&candidate_vector, &job_vector)?;

        Ok(to_percentage(cosine))
    }
}

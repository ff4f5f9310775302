//! Configuration management for the resume screener

use crate::error::{Result, ScreenerError};
use crate::models::catalog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub extraction: ExtractionConfig,
    pub ranking: RankingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    /// Model2Vec model: a catalog name, a directory under `models_dir`, or a hub repo id
    pub embedding_model: String,
    /// BERT token-classification model directory under `models_dir`
    pub ner_model: String,
    /// Linear skill classifier file under `models_dir`
    pub classifier_model: String,
    /// Resume category model file under `models_dir`
    #[serde(default = "default_category_model")]
    pub category_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub enable_ner: bool,
    pub enable_classifier: bool,
    #[serde(default = "default_true")]
    pub enable_category: bool,
    pub ner_char_budget: usize,
    pub ner_max_tokens: usize,
    #[serde(default)]
    pub custom_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub max_workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Csv,
}

fn default_category_model() -> String {
    "category-model.json".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-screener")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: "potion-base-8M".to_string(),
                ner_model: "resume-ner-bert-v2".to_string(),
                classifier_model: "skill-classifier.json".to_string(),
                category_model: default_category_model(),
            },
            extraction: ExtractionConfig {
                enable_ner: true,
                enable_classifier: true,
                enable_category: true,
                ner_char_budget: 2000,
                ner_max_tokens: 512,
                custom_skills: Vec::new(),
            },
            ranking: RankingConfig { max_workers: 4 },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScreenerError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ScreenerError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ScreenerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-screener")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.ranking.max_workers == 0 {
            return Err(ScreenerError::Configuration(
                "ranking.max_workers must be at least 1".to_string(),
            ));
        }
        if self.extraction.ner_char_budget == 0 || self.extraction.ner_max_tokens == 0 {
            return Err(ScreenerError::Configuration(
                "NER budgets must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    /// Resolve a model name to a local path under the models directory
    pub fn local_model_path(&self, name: &str) -> Option<PathBuf> {
        let path = self.models.models_dir.join(name);
        path.exists().then_some(path)
    }

    /// Resolve which optional strategies are active, once, at startup
    pub fn strategy_plan(&self) -> StrategyPlan {
        StrategyPlan {
            ner: self
                .extraction
                .enable_ner
                .then(|| self.models.models_dir.join(&self.models.ner_model)),
            classifier: self
                .extraction
                .enable_classifier
                .then(|| self.models.models_dir.join(&self.models.classifier_model)),
            category: self
                .extraction
                .enable_category
                .then(|| self.models.models_dir.join(&self.models.category_model)),
            embedding: self
                .local_model_path(&self.models.embedding_model)
                .map(EmbeddingSource::Local)
                .unwrap_or_else(|| {
                    EmbeddingSource::Hub(catalog::resolve_repo_id(&self.models.embedding_model))
                }),
        }
    }
}

/// Where each model comes from, or `None` when the strategy is switched off
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyPlan {
    pub ner: Option<PathBuf>,
    pub classifier: Option<PathBuf>,
    pub category: Option<PathBuf>,
    pub embedding: EmbeddingSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingSource {
    Local(PathBuf),
    Hub(String),
}

impl EmbeddingSource {
    pub fn as_path(&self) -> PathBuf {
        match self {
            EmbeddingSource::Local(path) => path.clone(),
            EmbeddingSource::Hub(repo_id) => PathBuf::from(repo_id),
        }
    }
}

//! Error handling for the resume screener

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Extraction strategy '{strategy}' failed: {reason}")]
    ExtractionStrategyFailure { strategy: String, reason: String },

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("DOCX extraction error: {0}")]
    DocxExtraction(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ScreenerError>;

impl ScreenerError {
    /// Build an inference failure for the named strategy
    pub fn strategy_failure(strategy: &str, reason: impl ToString) -> Self {
        ScreenerError::ExtractionStrategyFailure {
            strategy: strategy.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// model2vec reports loader errors through anyhow
impl From<anyhow::Error> for ScreenerError {
    fn from(err: anyhow::Error) -> Self {
        ScreenerError::ModelUnavailable(err.to_string())
    }
}

/// Convert candle core errors to our custom error type
impl From<candle_core::Error> for ScreenerError {
    fn from(err: candle_core::Error) -> Self {
        ScreenerError::ModelError(err.to_string())
    }
}

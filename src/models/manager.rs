//! Downloading and managing pretrained models on disk

use crate::error::{Result, ScreenerError};
use crate::models::catalog::{self, KnownModel};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Manager for embedding and NER models - handles download, discovery, and removal
pub struct ModelManager {
    models_dir: PathBuf,
    downloaded_models: HashSet<String>,
}

impl ModelManager {
    /// Create a new model manager rooted at `models_dir`
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir).await.map_err(|e| {
                ScreenerError::ModelError(format!("Failed to create models directory: {}", e))
            })?;
        }

        let mut manager = Self {
            models_dir,
            downloaded_models: HashSet::new(),
        };
        manager.scan_downloaded_models().await?;

        Ok(manager)
    }

    /// Scan for already downloaded models
    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await.map_err(|e| {
            ScreenerError::ModelError(format!("Failed to scan models directory: {}", e))
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            ScreenerError::ModelError(format!("Failed to read directory entry: {}", e))
        })? {
            let model_id = entry.file_name().to_string_lossy().to_string();
            if let Some(model) = catalog::find(&model_id) {
                if Self::is_complete(&entry.path(), model).await {
                    self.downloaded_models.insert(model.id.to_string());
                }
            }
        }

        Ok(())
    }

    async fn is_complete(path: &Path, model: &KnownModel) -> bool {
        for file in model.required_files {
            if fs::metadata(path.join(file)).await.is_err() {
                return false;
            }
        }
        true
    }

    /// Download a catalog model from the Hugging Face Hub
    pub async fn download_model(&mut self, model_id: &str, force: bool) -> Result<PathBuf> {
        let model = catalog::find(model_id)
            .ok_or_else(|| ScreenerError::ModelError(format!("Unknown model: {}", model_id)))?;

        let model_dir = self.models_dir.join(model.id);
        if !force && self.downloaded_models.contains(model.id) {
            return Ok(model_dir);
        }

        info!("Downloading model {} ({} MB) from {}", model.name, model.size_mb, model.repo_id);

        fs::create_dir_all(&model_dir).await.map_err(|e| {
            ScreenerError::ModelError(format!("Failed to create model directory: {}", e))
        })?;

        let api = Api::new()
            .map_err(|e| ScreenerError::ModelError(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.repo(hf_hub::Repo::model(model.repo_id.to_string()));

        for file in model.required_files {
            let cached = repo.get(file).await.map_err(|e| {
                ScreenerError::ModelError(format!("Failed to download required file {}: {}", file, e))
            })?;
            fs::copy(&cached, model_dir.join(file))
                .await
                .map_err(|e| ScreenerError::ModelError(format!("Failed to copy {}: {}", file, e)))?;
            info!("  downloaded {}", file);
        }

        for file in model.optional_files {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await.map_err(|e| {
                        ScreenerError::ModelError(format!("Failed to copy {}: {}", file, e))
                    })?;
                }
                Err(e) => warn!("Optional file {} not found: {}", file, e),
            }
        }

        self.downloaded_models.insert(model.id.to_string());
        Ok(model_dir)
    }

    /// Delete a downloaded model's directory
    pub async fn remove_model(&mut self, model_id: &str) -> Result<PathBuf> {
        let model = catalog::find(model_id)
            .ok_or_else(|| ScreenerError::ModelError(format!("Unknown model: {}", model_id)))?;
        let model_dir = self.models_dir.join(model.id);

        if !model_dir.exists() {
            return Err(ScreenerError::NotFound(model_dir));
        }

        fs::remove_dir_all(&model_dir)
            .await
            .map_err(|e| ScreenerError::ModelError(format!("Failed to remove model: {}", e)))?;
        self.downloaded_models.remove(model.id);
        Ok(model_dir)
    }

    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        let model = catalog::find(model_id)?;
        self.downloaded_models
            .contains(model.id)
            .then(|| self.models_dir.join(model.id))
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.get_model_path(model_id).is_some()
    }

    pub fn list_downloaded_models(&self) -> Vec<String> {
        let mut models: Vec<String> = self.downloaded_models.iter().cloned().collect();
        models.sort();
        models
    }
}

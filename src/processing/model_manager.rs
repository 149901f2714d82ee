//! Embedding model management for downloading and managing HuggingFace models

use crate::config::EmbeddingBackend;
use crate::error::{Result, ResumeAnalyzerError};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Information about an available embedding model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub id: String,
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub description: String,
    pub backend: EmbeddingBackend,
    pub dimensions: u32,
}

/// Where an embedding model will be loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Local(PathBuf),
    Hub(String),
}

impl ModelSource {
    /// Path handed to loaders that accept either a directory or a repo id
    pub fn as_load_target(&self) -> PathBuf {
        match self {
            ModelSource::Local(path) => path.clone(),
            ModelSource::Hub(repo_id) => PathBuf::from(repo_id),
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Local(path) => write!(f, "{}", path.display()),
            ModelSource::Hub(repo_id) => write!(f, "huggingface.co/{}", repo_id),
        }
    }
}

/// Built-in embedding models
pub fn catalog() -> Vec<EmbeddingModelInfo> {
    vec![
        EmbeddingModelInfo {
            id: "potion-base-8M".to_string(),
            name: "Potion Base 8M".to_string(),
            repo_id: "minishlab/potion-base-8M".to_string(),
            size_mb: 33,
            description: "Fast Model2Vec static embeddings (default)".to_string(),
            backend: EmbeddingBackend::Model2Vec,
            dimensions: 256,
        },
        EmbeddingModelInfo {
            id: "m2v-base".to_string(),
            name: "Model2Vec Base".to_string(),
            repo_id: "minishlab/M2V_base_output".to_string(),
            size_mb: 90,
            description: "Legacy Model2Vec base embeddings model".to_string(),
            backend: EmbeddingBackend::Model2Vec,
            dimensions: 256,
        },
        EmbeddingModelInfo {
            id: "all-MiniLM-L6-v2".to_string(),
            name: "all-MiniLM-L6-v2".to_string(),
            repo_id: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            size_mb: 91,
            description: "Sentence-transformers BERT model run with candle".to_string(),
            backend: EmbeddingBackend::Bert,
            dimensions: 384,
        },
    ]
}

/// Catalog entry matching an id, repo id or display name (case-insensitive)
pub fn find_known_model(input: &str) -> Option<EmbeddingModelInfo> {
    let input_lower = input.to_lowercase();
    catalog().into_iter().find(|m| {
        m.id == input || m.repo_id == input || m.name.to_lowercase() == input_lower || m.id.to_lowercase() == input_lower
    })
}

pub fn known_backend(input: &str) -> Option<EmbeddingBackend> {
    find_known_model(input).map(|m| m.backend)
}

/// Resolve a model spec to a local directory when one exists, else a hub repo id.
///
/// Checked in order: the spec as a path, `models_dir/<spec>`, and for catalog
/// models `models_dir/<id>`.
pub fn locate_model(models_dir: &Path, spec: &str) -> ModelSource {
    let as_path = Path::new(spec);
    if as_path.is_dir() {
        return ModelSource::Local(as_path.to_path_buf());
    }

    let in_models_dir = models_dir.join(spec);
    if in_models_dir.is_dir() {
        return ModelSource::Local(in_models_dir);
    }

    match find_known_model(spec) {
        Some(info) => {
            let local = models_dir.join(&info.id);
            if local.is_dir() {
                ModelSource::Local(local)
            } else {
                ModelSource::Hub(info.repo_id)
            }
        }
        None => ModelSource::Hub(spec.to_string()),
    }
}

/// Manager for embedding models - handles download, removal and lookup
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available_models: BTreeMap<String, EmbeddingModelInfo>,
    downloaded_models: BTreeSet<String>,
    api: Api,
}

impl EmbeddingModelManager {
    /// Create a new embedding model manager
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir).await.map_err(|e| {
                ResumeAnalyzerError::ModelError(format!(
                    "Failed to create models directory: {}", e
                ))
            })?;
        }

        let api = Api::new().map_err(|e| {
            ResumeAnalyzerError::ModelError(format!("Failed to initialize HF API: {}", e))
        })?;

        let available_models = catalog().into_iter().map(|m| (m.id.clone(), m)).collect();

        let mut manager = Self {
            models_dir,
            available_models,
            downloaded_models: BTreeSet::new(),
            api,
        };

        manager.scan_downloaded_models().await?;

        Ok(manager)
    }

    /// Scan for already downloaded models
    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await.map_err(|e| {
            ResumeAnalyzerError::ModelError(format!(
                "Failed to scan models directory: {}", e
            ))
        })?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && Self::is_valid_model_directory(&entry.path()).await {
                self.downloaded_models.insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    /// Both backends need a tokenizer, a config and safetensors weights
    async fn is_valid_model_directory(path: &Path) -> bool {
        for file in Self::required_files() {
            if fs::metadata(path.join(file)).await.is_err() {
                return false;
            }
        }
        true
    }

    fn required_files() -> [&'static str; 3] {
        ["config.json", "tokenizer.json", "model.safetensors"]
    }

    /// Download an embedding model from HuggingFace Hub
    pub async fn download_model(&mut self, model: &str, force: bool) -> Result<PathBuf> {
        let model_id = self.resolve_model_id(model)
            .ok_or_else(|| ResumeAnalyzerError::ModelError(format!("Unknown embedding model: {}", model)))?;
        let model_info = self.available_models[&model_id].clone();

        let model_dir = self.models_dir.join(&model_id);

        if self.downloaded_models.contains(&model_id) {
            if !force {
                return Ok(model_dir);
            }
            self.remove_model(&model_id).await?;
        }

        info!("Downloading embedding model {} from {}", model_info.name, model_info.repo_id);
        println!("📥 Downloading embedding model: {} ({} MB)", model_info.name, model_info.size_mb);
        println!("📍 Repository: {}", model_info.repo_id);

        fs::create_dir_all(&model_dir).await.map_err(|e| {
            ResumeAnalyzerError::ModelError(format!(
                "Failed to create model directory: {}", e
            ))
        })?;

        let repo = self.api.model(model_info.repo_id.clone());

        for file in Self::required_files() {
            let cached = repo.get(file).await.map_err(|e| {
                ResumeAnalyzerError::ModelError(format!("Failed to download required file {}: {}", file, e))
            })?;
            fs::copy(&cached, model_dir.join(file)).await.map_err(|e| {
                ResumeAnalyzerError::ModelError(format!("Failed to copy {}: {}", file, e))
            })?;
            println!("  ✅ Downloaded: {}", file);
        }

        match repo.get("README.md").await {
            Ok(cached) => {
                fs::copy(&cached, model_dir.join("README.md")).await?;
            }
            Err(e) => warn!("Optional file README.md not found: {}", e),
        }

        self.downloaded_models.insert(model_id);

        println!("✅ Embedding model {} downloaded successfully!", model_info.name);
        Ok(model_dir)
    }

    /// Remove a downloaded model directory
    pub async fn remove_model(&mut self, model: &str) -> Result<PathBuf> {
        let model_id = self.resolve_model_id(model).unwrap_or_else(|| model.to_string());
        if !self.downloaded_models.contains(&model_id) {
            return Err(ResumeAnalyzerError::ModelError(format!(
                "Model '{}' is not downloaded", model
            )));
        }

        let model_dir = self.models_dir.join(&model_id);
        fs::remove_dir_all(&model_dir).await.map_err(|e| {
            ResumeAnalyzerError::ModelError(format!("Failed to remove model: {}", e))
        })?;
        self.downloaded_models.remove(&model_id);
        Ok(model_dir)
    }

    /// Get path to a downloaded model
    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        if self.downloaded_models.contains(model_id) {
            Some(self.models_dir.join(model_id))
        } else {
            None
        }
    }

    /// List all available models
    pub fn list_available_models(&self) -> Vec<&EmbeddingModelInfo> {
        self.available_models.values().collect()
    }

    /// List downloaded models
    pub fn list_downloaded_models(&self) -> Vec<String> {
        self.downloaded_models.iter().cloned().collect()
    }

    /// Get model info by ID
    pub fn get_model_info(&self, model_id: &str) -> Option<&EmbeddingModelInfo> {
        self.available_models.get(model_id)
    }

    /// Check if a model is downloaded
    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded_models.contains(model_id)
    }

    /// Resolve model ID from various formats (id, repo_id, name)
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        if self.available_models.contains_key(input) {
            return Some(input.to_string());
        }
        find_known_model(input).map(|m| m.id)
    }
}

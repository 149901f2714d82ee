//! Sentence-transformer embeddings (BERT family) run with candle

use crate::config::Config;
use crate::error::{Result, ResumeAnalyzerError};
use crate::processing::embeddings::Embedder;
use crate::processing::model_manager::{self, ModelSource};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// Skill strings are short; this only guards against pathological input
const MAX_SEQUENCE_LENGTH: usize = 128;

struct ModelFiles {
    config: PathBuf,
    tokenizer: PathBuf,
    weights: PathBuf,
}

impl ModelFiles {
    fn in_dir(dir: &Path) -> Result<Self> {
        let files = Self {
            config: dir.join("config.json"),
            tokenizer: dir.join("tokenizer.json"),
            weights: dir.join("model.safetensors"),
        };
        for path in [&files.config, &files.tokenizer, &files.weights] {
            if !path.exists() {
                return Err(ResumeAnalyzerError::ModelError(format!(
                    "Model directory {} is missing {}",
                    dir.display(),
                    path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
                )));
            }
        }
        Ok(files)
    }

    async fn fetch(repo_id: &str) -> Result<Self> {
        let api = Api::new().map_err(|e| {
            ResumeAnalyzerError::ModelError(format!("Failed to initialize HF API: {}", e))
        })?;
        let repo = api.model(repo_id.to_string());

        let get = |file: &'static str| {
            let repo = &repo;
            async move {
                repo.get(file).await.map_err(|e| {
                    ResumeAnalyzerError::ModelError(format!("Failed to download {} from {}: {}", file, repo_id, e))
                })
            }
        };

        Ok(Self {
            config: get("config.json").await?,
            tokenizer: get("tokenizer.json").await?,
            weights: get("model.safetensors").await?,
        })
    }
}

/// Mean-pooled, L2-normalized BERT sentence embeddings
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    batch_size: usize,
    model_name: String,
}

impl BertEmbedder {
    pub async fn load(model_spec: &str, config: &Config) -> Result<Self> {
        let start_time = Instant::now();
        let source = model_manager::locate_model(config.models_dir(), model_spec);
        info!("Loading BERT embedding model from: {}", source);

        let files = match &source {
            ModelSource::Local(dir) => ModelFiles::in_dir(dir)?,
            ModelSource::Hub(repo_id) => ModelFiles::fetch(repo_id).await?,
        };

        let device = get_device_with_override()?;

        let config_content = std::fs::read_to_string(&files.config)?;
        let bert_config: BertConfig = serde_json::from_str(&config_content).map_err(|e| {
            ResumeAnalyzerError::ModelError(format!("Failed to parse model config: {}", e))
        })?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(|e| {
            ResumeAnalyzerError::ModelError(format!("Failed to load tokenizer: {}", e))
        })?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| ResumeAnalyzerError::ModelError(format!("Failed to configure tokenizer: {}", e)))?;

        // SAFETY: the weights file is not modified while mapped
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[files.weights], DTYPE, &device)? };
        let model = BertModel::load(vb, &bert_config)?;

        info!("Model loaded successfully in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            tokenizer,
            device,
            batch_size: config.processing.batch_size.max(1),
            model_name: model_spec.to_string(),
        })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let encodings = self.tokenizer.encode_batch(texts.to_vec(), true).map_err(|e| {
            ResumeAnalyzerError::Embedding(format!("Tokenization failed: {}", e))
        })?;

        let ids = encodings
            .iter()
            .map(|e| Tensor::new(e.get_ids(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let masks = encodings
            .iter()
            .map(|e| Tensor::new(e.get_attention_mask(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;

        let input_ids = Tensor::stack(&ids, 0)?;
        let attention_mask = Tensor::stack(&masks, 0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // Mean over real tokens only
        let mask = attention_mask.to_dtype(DTYPE)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?;

        let norms = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
        let normalized = pooled.broadcast_div(&norms)?;

        Ok(normalized.to_dtype(DType::F32)?.to_vec2::<f32>()?)
    }
}

impl Embedder for BertEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_chunk(&[text.to_string()])?
            .pop()
            .ok_or_else(|| ResumeAnalyzerError::Embedding("Model returned no embedding".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.embed_chunk(batch)?);
        }
        Ok(embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Get the best available device for inference (GPU if compiled in, CPU fallback)
pub fn get_best_device() -> Result<Device> {
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            info!("Using CUDA GPU for embeddings");
            return Ok(device);
        }
    }

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Using Metal GPU for embeddings");
                return Ok(device);
            }
            Err(e) => warn!("Metal GPU initialization failed: {}", e),
        }
    }

    Ok(Device::Cpu)
}

/// Get device with optional user override from `RESUME_ANALYZER_DEVICE`
pub fn get_device_with_override() -> Result<Device> {
    if let Ok(device_preference) = std::env::var("RESUME_ANALYZER_DEVICE") {
        match device_preference.to_lowercase().as_str() {
            "cpu" => return Ok(Device::Cpu),
            "cuda" => {
                #[cfg(feature = "cuda")]
                {
                    return Device::new_cuda(0).map_err(|e| {
                        ResumeAnalyzerError::ModelError(format!("Failed to initialize CUDA: {}", e))
                    });
                }
                #[cfg(not(feature = "cuda"))]
                {
                    return Err(ResumeAnalyzerError::ModelError(
                        "CUDA support not compiled in".to_string()
                    ));
                }
            }
            "metal" => {
                #[cfg(feature = "metal")]
                {
                    return Device::new_metal(0).map_err(|e| {
                        ResumeAnalyzerError::ModelError(format!("Failed to initialize Metal: {}", e))
                    });
                }
                #[cfg(not(feature = "metal"))]
                {
                    return Err(ResumeAnalyzerError::ModelError(
                        "Metal support not compiled in".to_string()
                    ));
                }
            }
            other => warn!("Unknown device '{}', falling back to auto-detection", other),
        }
    }

    get_best_device()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_model_files_reports_missing_weights() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("config.json"), "{}").unwrap();
        std::fs::write(temp_dir.path().join("tokenizer.json"), "{}").unwrap();

        let err = ModelFiles::in_dir(temp_dir.path()).err().unwrap();
        assert!(err.to_string().contains("model.safetensors"));
    }

    #[test]
    fn test_model_files_complete() {
        let temp_dir = TempDir::new().unwrap();
        for file in ["config.json", "tokenizer.json", "model.safetensors"] {
            std::fs::write(temp_dir.path().join(file), "{}").unwrap();
        }
        let files = ModelFiles::in_dir(temp_dir.path()).unwrap();
        assert_eq!(files.weights, temp_dir.path().join("model.safetensors"));
    }

    #[test]
    fn test_cpu_device_default() {
        let device = get_best_device().unwrap();
        if cfg!(not(any(feature = "cuda", feature = "metal"))) {
            assert!(matches!(device, Device::Cpu));
        }
    }
}

//! Sentence embeddings and cosine similarity

use crate::config::{Config, EmbeddingBackend};
use crate::error::{Result, ResumeAnalyzerError};
use crate::processing::bert::BertEmbedder;
use crate::processing::model_manager;
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use std::collections::HashMap;
use std::time::Instant;

/// Turns text into a fixed-size vector
pub trait Embedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, returning one vector per input in input order
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn model_name(&self) -> &str;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        (**self).embed_batch(texts)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Cosine similarity of two vectors. Zero-length or zero-norm input scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ResumeAnalyzerError::Processing(
            format!("Embedding dimensions don't match: {} vs {}", a.len(), b.len())
        ));
    }

    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}

/// Embed every distinct string once, in a single batch call
pub fn embed_distinct<'a, I>(embedder: &dyn Embedder, texts: I) -> Result<HashMap<String, Vec<f32>>>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut distinct: Vec<String> = Vec::new();
    for text in texts {
        if !distinct.contains(text) {
            distinct.push(text.clone());
        }
    }

    if distinct.is_empty() {
        return Ok(HashMap::new());
    }

    let start_time = Instant::now();
    let vectors = embedder.embed_batch(&distinct)?;
    if vectors.len() != distinct.len() {
        return Err(ResumeAnalyzerError::Embedding(format!(
            "Embedder returned {} vectors for {} inputs",
            vectors.len(),
            distinct.len()
        )));
    }
    debug!(
        "Embedded {} distinct strings with {} in {:.2?}",
        distinct.len(),
        embedder.model_name(),
        start_time.elapsed()
    );

    Ok(distinct.into_iter().zip(vectors).collect())
}

/// Model2Vec static embedding model
pub struct Model2VecEmbedder {
    model: StaticModel,
    batch_size: usize,
    model_name: String,
}

impl Model2VecEmbedder {
    pub async fn load(model_spec: &str, config: &Config) -> Result<Self> {
        let start_time = Instant::now();
        let source = model_manager::locate_model(config.models_dir(), model_spec);
        info!("Loading Model2Vec embedding model from: {}", source);

        let location = source.as_load_target();
        let model = tokio::task::spawn_blocking(move || {
            StaticModel::from_pretrained(&location, None, None, None)
        })
        .await
        .map_err(|e| ResumeAnalyzerError::ModelError(format!("Model loading task failed: {}", e)))?
        .map_err(|e| ResumeAnalyzerError::Embedding(format!("Failed to load model: {}", e)))?;

        info!("Model loaded successfully in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            batch_size: config.processing.batch_size.max(1),
            model_name: model_spec.to_string(),
        })
    }
}

impl Embedder for Model2VecEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.model.encode_single(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.model.encode(batch));
        }
        Ok(embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Load the embedder named by `model_override` or the configured default.
///
/// Models from the built-in catalog carry their own backend; anything else
/// uses `models.embedding_backend`.
pub async fn load_embedder(config: &Config, model_override: Option<&str>) -> Result<Box<dyn Embedder>> {
    let model_spec = model_override.unwrap_or(config.models.default_embedding_model.as_str());
    let backend = model_manager::known_backend(model_spec).unwrap_or(config.models.embedding_backend);

    match backend {
        EmbeddingBackend::Model2Vec => Ok(Box::new(Model2VecEmbedder::load(model_spec, config).await?)),
        EmbeddingBackend::Bert => Ok(Box::new(BertEmbedder::load(model_spec, config).await?)),
    }
}

//! Local sentence-transformer embeddings via `fastembed`.
//!
//! The transcript index was built with `multi-qa-mpnet-base-dot-v1`, which
//! `fastembed` does not ship, so the model is loaded from an ONNX export on
//! disk. The directory must hold `model.onnx` next to the Hugging Face
//! tokenizer files.
//!
//! Scores from the index are dot products, so a unit-length query vector only
//! rescales them and leaves the ranking unchanged.

use super::Embedder;
use crate::config::{EmbeddingPooling, EmbeddingSettings};
use crate::error::{Result, SearchError};
use async_trait::async_trait;
use fastembed::{
    InitOptionsUserDefined, Pooling, TextEmbedding, TokenizerFiles, UserDefinedEmbeddingModel,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

/// Files `load` expects inside the model directory.
pub const MODEL_FILES: [&str; 5] = [
    "model.onnx",
    "tokenizer.json",
    "config.json",
    "special_tokens_map.json",
    "tokenizer_config.json",
];

/// Embedder running an ONNX sentence model in-process.
pub struct LocalEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    name: String,
    dimensions: usize,
}

impl LocalEmbedder {
    /// Load the model exported to `dir`.
    pub fn load(
        dir: &Path,
        name: &str,
        pooling: EmbeddingPooling,
        dimensions: usize,
    ) -> Result<Self> {
        let missing = missing_model_files(dir);
        if !missing.is_empty() {
            return Err(SearchError::Config(format!(
                "Model '{}' not found in {} (missing: {}). Export it to ONNX there first",
                name,
                dir.display(),
                missing.join(", ")
            )));
        }

        let read = |file: &str| std::fs::read(dir.join(file));
        let tokenizer_files = TokenizerFiles {
            tokenizer_file: read("tokenizer.json")?,
            config_file: read("config.json")?,
            special_tokens_map_file: read("special_tokens_map.json")?,
            tokenizer_config_file: read("tokenizer_config.json")?,
        };
        let onnx = read("model.onnx")?;
        let definition = UserDefinedEmbeddingModel::new(onnx, tokenizer_files)
            .with_pooling(to_fastembed_pooling(pooling));

        let options = InitOptionsUserDefined::default();
        let model = TextEmbedding::try_new_from_user_defined(definition, options).map_err(|e| {
            SearchError::Embedding(format!("Failed to initialize model '{}': {}", name, e))
        })?;

        info!("Loaded embedding model {} from {}", name, dir.display());
        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            name: name.to_string(),
            dimensions,
        })
    }

    /// Load the model named in the `[embedding]` settings section.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        if settings.provider != "local" {
            return Err(SearchError::Config(format!(
                "Unsupported embedding provider: {}",
                settings.provider
            )));
        }
        Self::load(
            &settings.resolved_model_dir(),
            &settings.model,
            settings.pooling,
            settings.dimensions as usize,
        )
    }

    /// Model name, as configured.
    pub fn model(&self) -> &str {
        &self.name
    }
}

/// Names of the expected model files absent from `dir`.
pub fn missing_model_files(dir: &Path) -> Vec<&'static str> {
    MODEL_FILES
        .iter()
        .copied()
        .filter(|file| !dir.join(file).is_file())
        .collect()
}

/// Default location of an exported model: `<cache dir>/tubeseek/models/<model>`.
pub fn default_model_dir(model: &str) -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tubeseek")
        .join("models")
        .join(model)
}

fn to_fastembed_pooling(pooling: EmbeddingPooling) -> Pooling {
    match pooling {
        EmbeddingPooling::Cls => Pooling::Cls,
        EmbeddingPooling::Mean => Pooling::Mean,
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Inference is CPU-bound; keep it off the async workers.
        let model = Arc::clone(&self.model);
        let inputs = texts.to_vec();
        let embeddings = tokio::task::spawn_blocking(move || {
            model
                .lock()
                .map_err(|_| {
                    SearchError::Embedding("Embedding model lock is poisoned".to_string())
                })?
                .embed(inputs, None)
                .map_err(|e| {
                    SearchError::Embedding(format!("Failed to generate embeddings: {}", e))
                })
        })
        .await
        .map_err(|e| SearchError::Embedding(format!("Embedding task failed: {}", e)))??;

        if let Some(wrong) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(SearchError::Embedding(format!(
                "Expected {} dimensions, got {}",
                self.dimensions,
                wrong.len()
            )));
        }

        debug!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

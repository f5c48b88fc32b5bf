//! Query embedding.
//!
//! The index was built with a fixed embedding model; whatever implementation
//! is plugged in here must produce vectors in the same space.

mod local;
mod openai;

pub use local::{default_model_dir, missing_model_files, LocalEmbedder, MODEL_FILES};
pub use openai::OpenAIEmbedder;

use crate::config::EmbeddingSettings;
use crate::error::{Result, SearchError};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Build the embedder selected by `embedding.provider`.
pub fn create_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    match settings.provider.as_str() {
        "local" => Ok(Arc::new(LocalEmbedder::from_settings(settings)?)),
        "openai" => Ok(Arc::new(OpenAIEmbedder::from_settings(settings)?)),
        other => Err(SearchError::Config(format!(
            "Unsupported embedding provider: {}",
            other
        ))),
    }
}

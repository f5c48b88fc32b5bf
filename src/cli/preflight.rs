//! Pre-flight checks before talking to external services.
//!
//! Reports missing credentials up front instead of failing on the first
//! request.

use crate::config::{EmbeddingSettings, Settings, PINECONE_API_KEY_ENV};
use crate::embedding::missing_model_files;
use crate::error::{Result, SearchError};

/// Commands with external requirements.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// A one-off search needs the embedding backend and the index key.
    Search,
    /// The server needs the same as search.
    Serve,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Search | Operation::Serve => {
            check_embedder(&settings.embedding)?;
            check_index_key(settings)?;
        }
    }
    Ok(())
}

fn check_embedder(embedding: &EmbeddingSettings) -> Result<()> {
    match embedding.provider.as_str() {
        "openai" => check_openai_key(),
        _ => check_local_model(embedding),
    }
}

fn check_local_model(embedding: &EmbeddingSettings) -> Result<()> {
    let dir = embedding.resolved_model_dir();
    let missing = missing_model_files(&dir);
    if missing.is_empty() {
        return Ok(());
    }
    Err(SearchError::Config(format!(
        "Embedding model '{}' not found in {} (missing: {}). \
         Export it to ONNX there or set embedding.model_dir",
        embedding.model,
        dir.display(),
        missing.join(", ")
    )))
}

fn check_openai_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        _ => Err(SearchError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

fn check_index_key(settings: &Settings) -> Result<()> {
    settings.index.resolved_api_key().map(|_| ()).ok_or_else(|| {
        SearchError::Config(format!(
            "Pinecone API key not set. Set index.api_key in the config file or export {}",
            PINECONE_API_KEY_ENV
        ))
    })
}

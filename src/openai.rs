//! OpenAI client construction.

use crate::error::{Result, SearchError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Query embeddings are a single short string, so a short timeout is plenty.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Create an OpenAI client with the default timeout.
pub fn create_client() -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SearchError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}

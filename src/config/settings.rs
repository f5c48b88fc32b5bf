//! Configuration settings for tubeseek.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable consulted when `index.api_key` is not set.
pub const PINECONE_API_KEY_ENV: &str = "PINECONE_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub index: IndexSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (local, openai).
    pub provider: String,
    /// Embedding model to use. Must match the model the index was built with.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Directory holding the ONNX export of a local model.
    /// Defaults to `<cache dir>/tubeseek/models/<model>`.
    pub model_dir: Option<String>,
    /// Pooling applied to token embeddings of a local model.
    pub pooling: EmbeddingPooling,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            model: "multi-qa-mpnet-base-dot-v1".to_string(),
            dimensions: 768,
            model_dir: None,
            pooling: EmbeddingPooling::Cls,
        }
    }
}

impl EmbeddingSettings {
    /// Where the local model is read from.
    pub fn resolved_model_dir(&self) -> PathBuf {
        match self.model_dir.as_deref().filter(|d| !d.is_empty()) {
            Some(dir) => Settings::expand_path(dir),
            None => crate::embedding::default_model_dir(&self.model),
        }
    }
}

/// Pooling strategy for sentence-transformer models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingPooling {
    /// First-token pooling, used by the `multi-qa-*-dot-v1` models.
    #[default]
    Cls,
    Mean,
}

/// Managed vector index connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Pinecone API key. Falls back to `PINECONE_API_KEY`.
    pub api_key: Option<String>,
    /// Pinecone environment, e.g. `us-east1-gcp`.
    pub environment: String,
    /// Name of the transcript index.
    pub index_name: String,
    /// Explicit index host. When unset the host is resolved from the environment.
    pub host: Option<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            environment: "us-east1-gcp".to_string(),
            index_name: "seo-youtube-search".to_string(),
            host: None,
        }
    }
}

impl IndexSettings {
    /// Resolve the API key from the config file or the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(PINECONE_API_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
    }
}

/// Query settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of transcript segments requested from the index.
    pub top_k: usize,
    /// Attempts per query before giving up with an empty result.
    pub max_attempts: usize,
    /// Ask the index to return stored vectors with each match.
    pub include_values: bool,
    /// Ask the index to return metadata with each match.
    pub include_metadata: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            top_k: 10,
            max_attempts: 3,
            include_values: true,
            include_metadata: true,
        }
    }
}

/// HTTP front-end settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Page heading.
    pub title: String,
    /// Paragraphs shown under the heading.
    pub intro: Vec<String>,
    /// Highlighted note about how current the index is.
    pub index_notice: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            title: "A Better YouTube Search for SEOs".to_string(),
            intro: vec![
                "There is an abundance of excellent resources for SEO professionals on \
                 YouTube, yet finding the information you need can be a challenge. Publishers \
                 like Google Search Console, Moz, Ahrefs, and SEMrush offer a wealth of \
                 videos, webinars, and conference replays, and sifting through hours of \
                 content to answer a specific query is slow."
                    .to_string(),
                "Use this tool to find answers to complex SEO questions by semantically \
                 searching through an index of 1550 videos."
                    .to_string(),
            ],
            index_notice: Some(
                "Disclaimer: The index was built on Feb 8th, 2023 so any video published \
                 after this date by the included publishers will not be included. Check the \
                 published date of a result to make sure the information on a topic is up \
                 to date."
                    .to_string(),
            ),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = Self::resolve_config_path(path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SearchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.search.top_k == 0 {
            return Err(crate::error::SearchError::Config(
                "search.top_k must be at least 1".to_string(),
            ));
        }
        if self.search.max_attempts == 0 {
            return Err(crate::error::SearchError::Config(
                "search.max_attempts must be at least 1".to_string(),
            ));
        }
        if !matches!(self.embedding.provider.as_str(), "local" | "openai") {
            return Err(crate::error::SearchError::Config(format!(
                "embedding.provider must be \"local\" or \"openai\", got \"{}\"",
                self.embedding.provider
            )));
        }
        if self.index.index_name.is_empty() {
            return Err(crate::error::SearchError::Config(
                "index.index_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy of the settings safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.index.api_key = copy.index.api_key.as_deref().map(mask_secret);
        copy
    }

    /// The file `load_from(path)` reads: `path` with `~` expanded, or the default.
    pub fn resolve_config_path(path: Option<&PathBuf>) -> PathBuf {
        match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => Self::default_config_path(),
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tubeseek")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

/// Keep the first and last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_published_index() {
        let settings = Settings::default();
        assert_eq!(settings.index.environment, "us-east1-gcp");
        assert_eq!(settings.index.index_name, "seo-youtube-search");
        assert_eq!(settings.search.top_k, 10);
        assert_eq!(settings.search.max_attempts, 3);
        assert!(settings.search.include_values);
        assert!(settings.search.include_metadata);
    }

    #[test]
    fn test_default_embedder_is_local_mpnet() {
        let embedding = EmbeddingSettings::default();
        assert_eq!(embedding.provider, "local");
        assert_eq!(embedding.model, "multi-qa-mpnet-base-dot-v1");
        assert_eq!(embedding.dimensions, 768);
        assert_eq!(embedding.pooling, EmbeddingPooling::Cls);
        assert!(embedding
            .resolved_model_dir()
            .ends_with("models/multi-qa-mpnet-base-dot-v1"));
    }

    #[test]
    fn test_configured_model_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        let embedding = EmbeddingSettings {
            model_dir: Some(dir.path().to_string_lossy().to_string()),
            ..EmbeddingSettings::default()
        };
        assert_eq!(embedding.resolved_model_dir(), dir.path());
    }

    #[test]
    fn test_openai_provider_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            concat!(
                "[embedding]\n",
                "provider = \"openai\"\n",
                "model = \"text-embedding-3-small\"\n",
                "pooling = \"mean\"\n",
            ),
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.embedding.provider, "openai");
        assert_eq!(settings.embedding.pooling, EmbeddingPooling::Mean);
        assert_eq!(settings.embedding.dimensions, 768);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[embedding]\nprovider = \"word2vec\"\n").unwrap();
        assert!(Settings::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            concat!(
                "[index]\n",
                "index_name = \"talks\"\n",
                "host = \"talks-abc.svc.pinecone.io\"\n\n",
                "[search]\n",
                "top_k = 25\n",
            ),
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.index.index_name, "talks");
        assert_eq!(settings.index.host.as_deref(), Some("talks-abc.svc.pinecone.io"));
        assert_eq!(settings.index.environment, "us-east1-gcp");
        assert_eq!(settings.search.top_k, 25);
        assert_eq!(settings.search.max_attempts, 3);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.server.port, 8501);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\nmax_attempts = 0\n").unwrap();
        assert!(Settings::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_resolve_config_path() {
        let explicit = PathBuf::from("/etc/tubeseek/custom.toml");
        assert_eq!(Settings::resolve_config_path(Some(&explicit)), explicit);
        assert_eq!(
            Settings::resolve_config_path(None),
            Settings::default_config_path()
        );
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut settings = Settings::default();
        settings.server.port = 9000;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 9000);
    }

    #[test]
    fn test_redacted_masks_key() {
        let mut settings = Settings::default();
        settings.index.api_key = Some("abcd-1234-efgh-5678".to_string());
        let redacted = settings.redacted();
        assert_eq!(redacted.index.api_key.as_deref(), Some("abcd...5678"));
        assert_eq!(mask_secret("short"), "****");
    }

    #[test]
    fn test_configured_api_key_wins() {
        let index = IndexSettings {
            api_key: Some("from-file".to_string()),
            ..IndexSettings::default()
        };
        assert_eq!(index.resolved_api_key().as_deref(), Some("from-file"));
    }
}

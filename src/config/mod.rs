//! Configuration module for tubeseek.
//!
//! Handles loading and saving application settings.

mod settings;

pub use settings::{
    mask_secret, EmbeddingPooling, EmbeddingSettings, GeneralSettings, IndexSettings,
    SearchSettings, ServerSettings, Settings, PINECONE_API_KEY_ENV,
};

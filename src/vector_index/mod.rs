//! Vector index abstraction for tubeseek.
//!
//! The transcript index is built and maintained elsewhere; this module only
//! queries it. Backends implement [`VectorIndex`], and [`IndexConnector`]
//! produces fresh handles when a connection has to be re-established.

mod memory;
mod pinecone;

pub use memory::MemoryIndex;
pub use pinecone::{PineconeConnector, PineconeIndex};

use crate::error::{Result, SearchError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One retrieved transcript segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Index record ID.
    pub id: String,
    /// Video title.
    pub title: String,
    /// Base video URL, e.g. `https://www.youtube.com/watch?v=...`.
    pub url: String,
    /// Segment start (seconds).
    pub start: f64,
    /// Segment end (seconds).
    pub end: f64,
    /// Transcript text of the segment.
    pub text: String,
    /// Publisher channel, if recorded.
    pub channel: Option<String>,
    /// Publication year, if recorded.
    pub publish: Option<String>,
    /// Similarity score (higher is better).
    pub score: f32,
}

#[derive(Deserialize)]
struct SegmentMetadata {
    url: String,
    title: String,
    text: String,
    start: f64,
    end: f64,
    #[serde(default)]
    channel: Option<Value>,
    #[serde(default)]
    publish: Option<Value>,
}

impl Match {
    /// Build a match from an index record's metadata.
    ///
    /// Fails when any of `url`, `title`, `text`, `start` or `end` is missing
    /// or has the wrong type.
    pub fn from_metadata(id: &str, score: f32, metadata: &Map<String, Value>) -> Result<Self> {
        let meta: SegmentMetadata = serde_json::from_value(Value::Object(metadata.clone()))
            .map_err(|e| SearchError::Index(format!("Malformed metadata on {}: {}", id, e)))?;

        Ok(Self {
            id: id.to_string(),
            title: meta.title,
            url: meta.url,
            start: meta.start,
            end: meta.end,
            text: meta.text,
            channel: meta.channel.as_ref().and_then(metadata_string),
            publish: meta.publish.as_ref().and_then(metadata_string),
            score,
        })
    }
}

/// Render a scalar metadata value the way filters compare it.
///
/// Whole-number floats lose their fraction so a year stored as `2019.0`
/// still matches `"2019"`.
pub fn metadata_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i.to_string()),
            (None, Some(f)) if f.fract() == 0.0 => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        _ => None,
    }
}

/// Server-side metadata predicate: every field must take one of its listed values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFilter {
    fields: BTreeMap<String, Vec<String>>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `field` to the given values. An empty set matches nothing.
    pub fn include<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .insert(field.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Pinecone filter syntax: `{"field": {"$in": [...]}}`.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        for (field, values) in &self.fields {
            let mut clause = Map::new();
            clause.insert(
                "$in".to_string(),
                Value::Array(values.iter().cloned().map(Value::String).collect()),
            );
            root.insert(field.clone(), Value::Object(clause));
        }
        Value::Object(root)
    }

    /// Evaluate the filter locally against a metadata map.
    pub fn matches(&self, metadata: &Map<String, Value>) -> bool {
        self.fields.iter().all(|(field, allowed)| {
            metadata
                .get(field)
                .and_then(metadata_string)
                .is_some_and(|value| allowed.iter().any(|a| *a == value))
        })
    }
}

/// A similarity query against the index.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub include_values: bool,
    pub include_metadata: bool,
    pub filter: Option<MetadataFilter>,
}

impl QueryRequest {
    pub fn new(vector: Vec<f32>, top_k: usize) -> Self {
        Self {
            vector,
            top_k,
            include_values: true,
            include_metadata: true,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Read-only handle to a vector index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `top_k` matches ranked by similarity, best first.
    async fn query(&self, request: &QueryRequest) -> Result<Vec<Match>>;
}

/// Opens (or re-opens) a connection to a vector index.
#[async_trait]
pub trait IndexConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn VectorIndex>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

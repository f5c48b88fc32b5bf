//! In-memory vector index.
//!
//! Useful for testing and for wiring the pipeline without a network index.

use super::{cosine_similarity, Match, QueryRequest, VectorIndex};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::RwLock;
use tracing::warn;

struct Record {
    id: String,
    values: Vec<f32>,
    metadata: Map<String, Value>,
}

/// In-memory vector index.
#[derive(Default)]
pub struct MemoryIndex {
    records: RwLock<Vec<Record>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub fn upsert(&self, id: &str, values: Vec<f32>, metadata: Map<String, Value>) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.retain(|r| r.id != id);
        records.push(Record {
            id: id.to_string(),
            values,
            metadata,
        });
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn query(&self, request: &QueryRequest) -> Result<Vec<Match>> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());

        let mut scored: Vec<(&Record, f32)> = records
            .iter()
            .filter(|r| {
                request
                    .filter
                    .as_ref()
                    .map_or(true, |f| f.matches(&r.metadata))
            })
            .map(|r| (r, cosine_similarity(&request.vector, &r.values)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(request.top_k);

        let mut matches = Vec::with_capacity(scored.len());
        for (record, score) in scored {
            match Match::from_metadata(&record.id, score, &record.metadata) {
                Ok(m) => matches.push(m),
                Err(e) => warn!("Skipping record: {}", e),
            }
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_index::MetadataFilter;
    use serde_json::json;

    fn segment(channel: &str, publish: &str, text: &str) -> Map<String, Value> {
        match json!({
            "url": "https://www.youtube.com/watch?v=vid",
            "title": "Video",
            "text": text,
            "start": 0.0,
            "end": 10.0,
            "channel": channel,
            "publish": publish
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_ranked_and_truncated() {
        let index = MemoryIndex::new();
        index.upsert("a", vec![1.0, 0.0], segment("GSC", "2020", "exact"));
        index.upsert("b", vec![0.7, 0.7], segment("GSC", "2020", "close"));
        index.upsert("c", vec![0.0, 1.0], segment("GSC", "2020", "far"));

        let matches = index.query(&QueryRequest::new(vec![1.0, 0.0], 2)).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].text, "exact");
        assert_eq!(matches[1].text, "close");
        assert!(matches[0].score > matches[1].score);
    }

    #[tokio::test]
    async fn test_filter_applied() {
        let index = MemoryIndex::new();
        index.upsert("a", vec![1.0, 0.0], segment("GSC", "2020", "gsc"));
        index.upsert("b", vec![1.0, 0.0], segment("MOZ", "2020", "moz"));
        index.upsert("c", vec![1.0, 0.0], segment("MOZ", "2015", "old moz"));

        let request = QueryRequest::new(vec![1.0, 0.0], 10).with_filter(
            MetadataFilter::new()
                .include("channel", ["MOZ"])
                .include("publish", ["2020"]),
        );
        let matches = index.query(&request).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "moz");
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let index = MemoryIndex::new();
        index.upsert("a", vec![1.0], segment("GSC", "2020", "first"));
        index.upsert("a", vec![1.0], segment("GSC", "2020", "second"));
        assert_eq!(index.len(), 1);
    }
}

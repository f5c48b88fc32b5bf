//! Search pipeline: embed the query, retrieve matches, aggregate per video.

use crate::aggregate::{aggregate, VideoGroupDisplay};
use crate::config::Settings;
use crate::embedding::{create_embedder, Embedder};
use crate::error::Result;
use crate::filters::SearchFilter;
use crate::retriever::MatchRetriever;
use crate::vector_index::PineconeConnector;
use std::sync::Arc;
use tracing::{info, instrument};

/// Process-lifetime search service.
///
/// Holds the embedder and the retriever (with its index connection); both
/// are created once and shared by every query.
pub struct SearchPipeline {
    embedder: Arc<dyn Embedder>,
    retriever: MatchRetriever,
    top_k: usize,
}

impl SearchPipeline {
    /// Create the pipeline from settings, opening the index connection.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let embedder = create_embedder(&settings.embedding)?;
        let connector = Arc::new(PineconeConnector::from_settings(&settings.index)?);
        let retriever = MatchRetriever::connect(connector)
            .await?
            .with_max_attempts(settings.search.max_attempts)
            .with_includes(
                settings.search.include_values,
                settings.search.include_metadata,
            );

        Ok(Self::new(embedder, retriever).with_top_k(settings.search.top_k))
    }

    /// Create a pipeline with custom components.
    pub fn new(embedder: Arc<dyn Embedder>, retriever: MatchRetriever) -> Self {
        Self {
            embedder,
            retriever,
            top_k: 10,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn retriever(&self) -> &MatchRetriever {
        &self.retriever
    }

    /// Run a query with the default `top_k`.
    pub async fn search(
        &self,
        query: &str,
        filter: &SearchFilter,
    ) -> Result<Vec<VideoGroupDisplay>> {
        self.search_with_top_k(query, filter, self.top_k).await
    }

    /// Run a query and return one display record per video.
    ///
    /// A blank query returns no results without touching the embedder or the
    /// index. Embedding failures propagate; retrieval failures yield no results.
    #[instrument(skip(self, filter))]
    pub async fn search_with_top_k(
        &self,
        query: &str,
        filter: &SearchFilter,
        top_k: usize,
    ) -> Result<Vec<VideoGroupDisplay>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        info!("Query: {}", query);

        let vector = self.embedder.embed(query).await?;
        let matches = self
            .retriever
            .retrieve(vector, top_k.max(1), Some(filter.to_metadata_filter()))
            .await;

        Ok(aggregate(&matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DisplayLine;
    use crate::error::SearchError;
    use crate::filters::{Channel, PublishYear};
    use crate::vector_index::{IndexConnector, MemoryIndex, VectorIndex};
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Maps known words to fixed axes so similarity is predictable.
    struct KeywordEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = text.to_lowercase();
            Ok(vec![
                if text.contains("crawl") { 1.0 } else { 0.0 },
                if text.contains("links") { 1.0 } else { 0.0 },
                0.1,
            ])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(SearchError::Embedding("model unavailable".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(SearchError::Embedding("model unavailable".to_string()))
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    struct SharedIndex(Arc<MemoryIndex>);

    #[async_trait]
    impl IndexConnector for SharedIndex {
        async fn connect(&self) -> Result<Arc<dyn VectorIndex>> {
            Ok(self.0.clone())
        }
    }

    /// Metadata for one transcript segment: `(start, end, text)` within `video`.
    fn meta(
        video: &str,
        title: &str,
        span: (f64, f64, &str),
        channel: &str,
        year: &str,
    ) -> Map<String, Value> {
        let (start, end, text) = span;
        match json!({
            "url": format!("https://www.youtube.com/watch?v={}", video),
            "title": title,
            "text": text,
            "start": start,
            "end": end,
            "channel": channel,
            "publish": year
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn seeded_index() -> Arc<MemoryIndex> {
        let index = MemoryIndex::new();
        index.upsert(
            "crawl-1",
            vec![1.0, 0.0, 0.1],
            meta(
                "crawl",
                "Crawl budget",
                (10.0, 30.0, "crawl budget is about server capacity"),
                "GSC",
                "2021",
            ),
        );
        index.upsert(
            "crawl-2",
            vec![0.9, 0.0, 0.1],
            meta(
                "crawl",
                "Crawl budget",
                (20.0, 40.0, "server capacity limits how fast we crawl"),
                "GSC",
                "2021",
            ),
        );
        index.upsert(
            "links-1",
            vec![0.0, 1.0, 0.1],
            meta(
                "links",
                "Link building",
                (0.0, 15.0, "links are still a signal"),
                "Ahrefs",
                "2019",
            ),
        );
        Arc::new(index)
    }

    async fn pipeline_with(embedder: Arc<dyn Embedder>) -> SearchPipeline {
        let retriever = MatchRetriever::connect(Arc::new(SharedIndex(seeded_index())))
            .await
            .unwrap();
        SearchPipeline::new(embedder, retriever)
    }

    #[tokio::test]
    async fn test_blank_query_short_circuits() {
        let embedder = Arc::new(KeywordEmbedder {
            calls: AtomicUsize::new(0),
        });
        let pipeline = pipeline_with(embedder.clone()).await;

        let cards = pipeline.search("   ", &SearchFilter::default()).await.unwrap();
        assert!(cards.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_groups_by_video() {
        let embedder = Arc::new(KeywordEmbedder {
            calls: AtomicUsize::new(0),
        });
        let pipeline = pipeline_with(embedder).await;

        let cards = pipeline
            .search("how does crawl budget work", &SearchFilter::default())
            .await
            .unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].video_id, "crawl");
        assert_eq!(cards[0].title, "Crawl budget");
        assert_eq!(
            cards[0].thumbnail_url,
            "https://img.youtube.com/vi/crawl/maxresdefault.jpg"
        );
        // second window overlaps the first and continues it
        assert_eq!(
            cards[0].lines.iter().filter(|l| **l == DisplayLine::Break).count(),
            1
        );
        assert_eq!(cards[1].video_id, "links");
    }

    #[tokio::test]
    async fn test_filter_restricts_channels() {
        let embedder = Arc::new(KeywordEmbedder {
            calls: AtomicUsize::new(0),
        });
        let pipeline = pipeline_with(embedder).await;

        let filter = SearchFilter::from_selection(Some(vec![Channel::Ahrefs]), None);
        let cards = pipeline.search("crawl", &filter).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].video_id, "links");

        let years = vec![PublishYear::new(2015).unwrap()];
        let filter = SearchFilter::from_selection(None, Some(years));
        assert!(pipeline.search("crawl", &filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_top_k_limits_matches() {
        let embedder = Arc::new(KeywordEmbedder {
            calls: AtomicUsize::new(0),
        });
        let pipeline = pipeline_with(embedder).await.with_top_k(1);

        let cards = pipeline.search("crawl", &SearchFilter::default()).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].lines.len(), 2);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let pipeline = pipeline_with(Arc::new(FailingEmbedder)).await;
        let result = pipeline.search("crawl", &SearchFilter::default()).await;
        assert!(matches!(result, Err(SearchError::Embedding(_))));
    }
}

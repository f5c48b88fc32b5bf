//! Match retrieval with bounded retry.
//!
//! A failed query re-opens the index connection and tries again, up to a
//! fixed number of attempts. Exhausting the budget is not an error for the
//! caller: the result is simply empty.

use crate::error::Result;
use crate::vector_index::{IndexConnector, Match, MetadataFilter, QueryRequest, VectorIndex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// Default number of query attempts.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Issues similarity queries and owns the long-lived index handle.
pub struct MatchRetriever {
    connector: Arc<dyn IndexConnector>,
    index: RwLock<Arc<dyn VectorIndex>>,
    max_attempts: usize,
    include_values: bool,
    include_metadata: bool,
    reconnects: AtomicUsize,
}

impl MatchRetriever {
    /// Open the initial connection through `connector`.
    pub async fn connect(connector: Arc<dyn IndexConnector>) -> Result<Self> {
        let index = connector.connect().await?;
        Ok(Self::with_index(connector, index))
    }

    /// Use an already-open handle; `connector` is only used to reconnect.
    pub fn with_index(connector: Arc<dyn IndexConnector>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            connector,
            index: RwLock::new(index),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            include_values: true,
            include_metadata: true,
            reconnects: AtomicUsize::new(0),
        }
    }

    /// Set the attempt budget. Values below one are treated as one.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Choose whether stored vectors and metadata are requested.
    pub fn with_includes(mut self, include_values: bool, include_metadata: bool) -> Self {
        self.include_values = include_values;
        self.include_metadata = include_metadata;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Number of times the connection has been re-opened.
    pub fn reconnects(&self) -> usize {
        self.reconnects.load(Ordering::Relaxed)
    }

    /// Query the index, retrying transient failures.
    ///
    /// Returns matches ranked by similarity, at most `top_k` of them, or an
    /// empty list when every attempt failed.
    #[instrument(skip(self, vector, filter), fields(dims = vector.len()))]
    pub async fn retrieve(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        filter: Option<MetadataFilter>,
    ) -> Vec<Match> {
        let request = QueryRequest {
            vector,
            top_k,
            include_values: self.include_values,
            include_metadata: self.include_metadata,
            filter,
        };

        for attempt in 1..=self.max_attempts {
            let index = self.index.read().await.clone();

            match index.query(&request).await {
                Ok(matches) => {
                    if matches.is_empty() {
                        info!("Query succeeded with no matches");
                    } else {
                        debug!("Retrieved {} matches on attempt {}", matches.len(), attempt);
                    }
                    return matches;
                }
                Err(e) => {
                    warn!(attempt, max = self.max_attempts, "Query failed: {}", e);
                    if attempt < self.max_attempts {
                        self.reconnect().await;
                    }
                }
            }
        }

        error!(
            "Query failed after {} attempts; returning no results",
            self.max_attempts
        );
        Vec::new()
    }

    async fn reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
        match self.connector.connect().await {
            Ok(index) => *self.index.write().await = index,
            Err(e) => warn!("Reconnect failed, keeping previous handle: {}", e),
        }
    }
}

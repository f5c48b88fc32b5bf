//! Pinecone REST client.

use super::{IndexConnector, Match, QueryRequest, VectorIndex};
use crate::config::IndexSettings;
use crate::error::{Result, SearchError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_values: bool,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Deserialize)]
struct RawMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct WhoAmI {
    project_name: String,
}

/// Handle to one Pinecone index.
pub struct PineconeIndex {
    http: reqwest::Client,
    query_url: Url,
    api_key: String,
}

impl PineconeIndex {
    /// Create a handle for an index served at `host`.
    ///
    /// `host` may be given with or without a scheme; https is assumed.
    pub fn new(http: reqwest::Client, host: &str, api_key: &str) -> Result<Self> {
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        let query_url = Url::parse(&base)?.join("query")?;

        Ok(Self {
            http,
            query_url,
            api_key: api_key.to_string(),
        })
    }

    pub fn query_url(&self) -> &Url {
        &self.query_url
    }
}

fn query_body(request: &QueryRequest) -> QueryBody<'_> {
    QueryBody {
        vector: &request.vector,
        top_k: request.top_k,
        include_values: request.include_values,
        include_metadata: request.include_metadata,
        filter: request
            .filter
            .as_ref()
            .filter(|f| !f.is_empty())
            .map(|f| f.to_json()),
    }
}

fn parse_matches(response: QueryResponse) -> Vec<Match> {
    let mut matches = Vec::with_capacity(response.matches.len());
    for raw in response.matches {
        let Some(metadata) = raw.metadata else {
            warn!(id = %raw.id, "Skipping match without metadata");
            continue;
        };
        match Match::from_metadata(&raw.id, raw.score, &metadata) {
            Ok(m) => matches.push(m),
            Err(e) => warn!("Skipping match: {}", e),
        }
    }
    matches
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[instrument(skip(self, request), fields(top_k = request.top_k))]
    async fn query(&self, request: &QueryRequest) -> Result<Vec<Match>> {
        let response = self
            .http
            .post(self.query_url.clone())
            .header("Api-Key", &self.api_key)
            .json(&query_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Index(format!(
                "Query returned {}: {}",
                status, body
            )));
        }

        let parsed: QueryResponse = response.json().await?;
        let matches = parse_matches(parsed);
        debug!("Index returned {} matches", matches.len());
        Ok(matches)
    }
}

/// Opens Pinecone index handles from `(api_key, environment, index_name)`.
pub struct PineconeConnector {
    http: reqwest::Client,
    api_key: String,
    environment: String,
    index_name: String,
    host: Option<String>,
}

impl PineconeConnector {
    pub fn new(api_key: &str, environment: &str, index_name: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            environment: environment.to_string(),
            index_name: index_name.to_string(),
            host: None,
        })
    }

    /// Skip host discovery and talk to this host directly.
    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host = host.filter(|h| !h.is_empty());
        self
    }

    /// Build a connector from the `[index]` settings section.
    pub fn from_settings(settings: &IndexSettings) -> Result<Self> {
        let api_key = settings.resolved_api_key().ok_or_else(|| {
            SearchError::Config(
                "Pinecone API key not set. Set index.api_key or PINECONE_API_KEY".to_string(),
            )
        })?;
        Ok(Self::new(&api_key, &settings.environment, &settings.index_name)?
            .with_host(settings.host.clone()))
    }

    fn controller_url(&self) -> String {
        format!(
            "https://controller.{}.pinecone.io/actions/whoami",
            self.environment
        )
    }

    fn index_host(&self, project_name: &str) -> String {
        format!(
            "{}-{}.svc.{}.pinecone.io",
            self.index_name, project_name, self.environment
        )
    }

    async fn resolve_host(&self) -> Result<String> {
        let response = self
            .http
            .get(self.controller_url())
            .header("Api-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Index(format!(
                "Project lookup in {} returned {}",
                self.environment, status
            )));
        }

        let who: WhoAmI = response.json().await?;
        Ok(self.index_host(&who.project_name))
    }
}

#[async_trait]
impl IndexConnector for PineconeConnector {
    #[instrument(skip(self), fields(index = %self.index_name))]
    async fn connect(&self) -> Result<Arc<dyn VectorIndex>> {
        let host = match &self.host {
            Some(host) => host.clone(),
            None => self.resolve_host().await?,
        };
        info!("Connecting to index at {}", host);

        let index = PineconeIndex::new(self.http.clone(), &host, &self.api_key)?;
        Ok(Arc::new(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_index::MetadataFilter;
    use serde_json::json;

    #[test]
    fn test_query_body_serialization() {
        let request = QueryRequest::new(vec![0.5, -0.25], 10)
            .with_filter(MetadataFilter::new().include("channel", ["GSC"]));

        let body = serde_json::to_value(query_body(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "vector": [0.5, -0.25],
                "topK": 10,
                "includeValues": true,
                "includeMetadata": true,
                "filter": { "channel": { "$in": ["GSC"] } }
            })
        );
    }

    #[test]
    fn test_query_body_omits_missing_filter() {
        let request = QueryRequest::new(vec![1.0], 3);
        let body = serde_json::to_value(query_body(&request)).unwrap();
        assert!(body.get("filter").is_none());
    }

    #[test]
    fn test_parse_matches_skips_malformed() {
        let response: QueryResponse = serde_json::from_value(json!({
            "matches": [
                {
                    "id": "abc-0",
                    "score": 0.91,
                    "values": [0.1, 0.2],
                    "metadata": {
                        "url": "https://www.youtube.com/watch?v=abc",
                        "title": "Title",
                        "text": "some text",
                        "start": 12.0,
                        "end": 40.0,
                        "channel": "MOZ",
                        "publish": "2018"
                    }
                },
                { "id": "abc-1", "score": 0.5, "metadata": { "title": "no url" } },
                { "id": "abc-2", "score": 0.4 }
            ],
            "namespace": ""
        }))
        .unwrap();

        let matches = parse_matches(response);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "abc-0");
        assert_eq!(matches[0].publish.as_deref(), Some("2018"));
    }

    #[test]
    fn test_index_url_from_bare_host() {
        let host = "talks-p1.svc.us-east1-gcp.pinecone.io";
        let index = PineconeIndex::new(reqwest::Client::new(), host, "k").unwrap();
        assert_eq!(
            index.query_url().as_str(),
            "https://talks-p1.svc.us-east1-gcp.pinecone.io/query"
        );
    }

    #[test]
    fn test_host_discovery_urls() {
        let connector =
            PineconeConnector::new("key", "us-east1-gcp", "seo-youtube-search").unwrap();
        assert_eq!(
            connector.controller_url(),
            "https://controller.us-east1-gcp.pinecone.io/actions/whoami"
        );
        assert_eq!(
            connector.index_host("abc123"),
            "seo-youtube-search-abc123.svc.us-east1-gcp.pinecone.io"
        );
    }

    #[test]
    fn test_settings_without_key_rejected() {
        let settings = IndexSettings {
            api_key: Some(String::new()),
            ..IndexSettings::default()
        };
        if std::env::var("PINECONE_API_KEY").is_err() {
            assert!(matches!(
                PineconeConnector::from_settings(&settings),
                Err(SearchError::Config(_))
            ));
        }
    }
}

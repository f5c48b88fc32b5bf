//! Web front-end: search page, JSON search endpoint and health check.

use crate::aggregate::VideoGroupDisplay;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::filters::{Channel, PublishYear, SearchFilter};
use crate::pipeline::SearchPipeline;
use crate::render::{render_page, PageForm, PageHeader};
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

/// Shared application state.
struct AppState {
    pipeline: SearchPipeline,
    header: PageHeader,
}

/// Run the HTTP server.
pub async fn run_serve(
    host: Option<&str>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check(Operation::Serve, &settings)?;

    let host = host.unwrap_or(&settings.server.host).to_string();
    let port = port.unwrap_or(settings.server.port);

    let pipeline = SearchPipeline::from_settings(&settings).await?;
    let header = PageHeader::from(&settings.server);
    let app = router(Arc::new(AppState { pipeline, header }));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("tubeseek");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Search page", "GET  /");
    Output::kv("Search (JSON)", "POST /search");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(search_page))
        .route("/search", post(search))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    channels: Option<Vec<Channel>>,
    #[serde(default)]
    years: Option<Vec<PublishYear>>,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    videos: Vec<VideoGroupDisplay>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Decode the page's query string: `q`, repeated `channel` and `year`.
///
/// A field with no valid value selected falls back to all values.
fn parse_page_query(raw: Option<&str>) -> PageForm {
    let mut query = String::new();
    let mut channels = Vec::new();
    let mut years = Vec::new();

    for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        match key.as_ref() {
            "q" => query = value.into_owned(),
            "channel" => match value.parse::<Channel>() {
                Ok(c) if !channels.contains(&c) => channels.push(c),
                Ok(_) => {}
                Err(e) => warn!("Ignoring channel: {}", e),
            },
            "year" => match value.parse::<PublishYear>() {
                Ok(y) if !years.contains(&y) => years.push(y),
                Ok(_) => {}
                Err(e) => warn!("Ignoring year: {}", e),
            },
            _ => {}
        }
    }

    PageForm {
        query,
        filter: SearchFilter::from_selection(
            (!channels.is_empty()).then_some(channels),
            (!years.is_empty()).then_some(years),
        ),
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn search_page(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> impl IntoResponse {
    let form = parse_page_query(raw.as_deref());
    let header = &state.header;

    if form.query.trim().is_empty() {
        return (StatusCode::OK, Html(render_page(header, &form, &[], None)));
    }

    match state.pipeline.search(&form.query, &form.filter).await {
        Ok(cards) => {
            let notice = cards.is_empty().then_some("No results found.");
            (StatusCode::OK, Html(render_page(header, &form, &cards, notice)))
        }
        Err(e) => {
            error!("Search failed: {}", e);
            let notice = format!("Search failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_page(header, &form, &[], Some(&notice))),
            )
        }
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let filter = SearchFilter::from_selection(req.channels, req.years);
    let top_k = req.top_k.unwrap_or(state.pipeline.top_k());

    match state
        .pipeline
        .search_with_top_k(&req.query, &filter, top_k)
        .await
    {
        Ok(videos) => (StatusCode::OK, Json(SearchResponse { videos })).into_response(),
        Err(e) => {
            error!("Search failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

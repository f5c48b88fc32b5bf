//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::filters::{Channel, PublishYear, SearchFilter};
use crate::pipeline::SearchPipeline;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    channels: &[Channel],
    years: &[PublishYear],
    top_k: Option<usize>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    if query.trim().is_empty() {
        Output::warning("Empty query; nothing to search.");
        return Ok(());
    }

    preflight::check(Operation::Search, &settings)?;

    let filter = SearchFilter::from_selection(
        (!channels.is_empty()).then(|| channels.to_vec()),
        (!years.is_empty()).then(|| years.to_vec()),
    );

    let pipeline = SearchPipeline::from_settings(&settings).await?;
    let top_k = top_k.unwrap_or(pipeline.top_k());

    let spinner = (!json).then(|| Output::spinner("Searching..."));
    let results = pipeline.search_with_top_k(query, &filter, top_k).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let cards = match results {
        Ok(cards) => cards,
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    if cards.is_empty() {
        Output::warning("No results found matching your query.");
    } else {
        Output::success(&format!("Found {} videos", cards.len()));
        for card in &cards {
            Output::video_card(card);
        }
    }

    Ok(())
}

//! tubeseek - semantic search over YouTube transcripts
//!
//! A thin front-end over a pre-built vector index of transcript segments:
//! a query is embedded, nearest segments are retrieved from the index, and
//! the results are folded into one timestamp-linked card per video.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `embedding` - Query embedding
//! - `vector_index` - Vector index abstraction (Pinecone, in-memory)
//! - `retriever` - Similarity queries with bounded retry
//! - `aggregate` - Grouping and timestamp merging per video
//! - `filters` - Channel and publication-year selections
//! - `pipeline` - End-to-end search
//! - `render` - HTML output
//! - `cli` - Command-line interface and web front-end
//!
//! # Example
//!
//! ```rust,no_run
//! use tubeseek::config::Settings;
//! use tubeseek::filters::SearchFilter;
//! use tubeseek::pipeline::SearchPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = SearchPipeline::from_settings(&settings).await?;
//!
//!     let cards = pipeline.search("what is crawl budget", &SearchFilter::default()).await?;
//!     for card in &cards {
//!         println!("{} ({} lines)", card.title, card.lines.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod filters;
pub mod openai;
pub mod pipeline;
pub mod render;
pub mod retriever;
pub mod vector_index;

pub use error::{Result, SearchError};

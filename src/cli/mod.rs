//! CLI module for tubeseek.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::filters::{Channel, PublishYear};
use clap::{Parser, Subcommand};

/// tubeseek - semantic search over YouTube transcripts
///
/// Embeds a query, retrieves matching transcript segments from the vector
/// index and shows them grouped by video with clickable timestamps.
#[derive(Parser, Debug)]
#[command(name = "tubeseek")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the transcript index
    Search {
        /// Search query
        query: String,

        /// Restrict to a channel (repeatable; default: all)
        #[arg(long = "channel")]
        channels: Vec<Channel>,

        /// Restrict to a publication year (repeatable; default: all)
        #[arg(long = "year")]
        years: Vec<PublishYear>,

        /// Number of transcript segments to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the web front-end
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check API keys and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

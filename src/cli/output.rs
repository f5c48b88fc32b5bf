//! CLI output formatting utilities.

use crate::aggregate::{DisplayLine, VideoGroupDisplay};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one video's result card.
    pub fn video_card(card: &VideoGroupDisplay) {
        println!(
            "\n{} {} ({})",
            style(">>").green(),
            style(&card.title).bold(),
            style(&card.url).dim()
        );

        let mut first = true;
        for line in &card.lines {
            match line {
                DisplayLine::Break => {
                    if !first {
                        println!();
                    }
                }
                DisplayLine::Text { text, url } => {
                    println!("   {}...", text);
                    println!("   {}", style(url).dim());
                }
            }
            first = false;
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

//! Doctor command - verify credentials and configuration.

use crate::cli::Output;
use crate::config::{mask_secret, EmbeddingSettings, Settings, PINECONE_API_KEY_ENV};
use crate::embedding::missing_model_files;
use crate::vector_index::{IndexConnector, PineconeConnector};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks against the settings loaded from `config_path`.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("tubeseek doctor");
    println!();

    let mut checks = Vec::new();

    println!("{}", style("Embedding").bold());
    let embedder = check_embedder(&settings.embedding);
    embedder.print();
    checks.push(embedder);

    println!();

    println!("{}", style("API Configuration").bold());

    let pinecone = check_index_api_key(settings.index.resolved_api_key().as_deref());
    pinecone.print();
    let have_index_key = pinecone.status != CheckStatus::Error;
    checks.push(pinecone);

    println!();

    println!("{}", style("Index").bold());
    let index_settings = check_index_settings(settings);
    index_settings.print();
    checks.push(index_settings);

    if have_index_key {
        let connection = check_index_connection(settings).await;
        connection.print();
        checks.push(connection);
    }

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before searching.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Ready to search.");
    }

    Ok(())
}

fn check_embedder(embedding: &EmbeddingSettings) -> CheckResult {
    match embedding.provider.as_str() {
        "openai" => check_openai_api_key(std::env::var("OPENAI_API_KEY").ok().as_deref()),
        _ => check_local_model(embedding),
    }
}

fn check_local_model(embedding: &EmbeddingSettings) -> CheckResult {
    let dir = embedding.resolved_model_dir();
    let missing = missing_model_files(&dir);
    if missing.is_empty() {
        return CheckResult::ok(
            "Local model",
            &format!(
                "{} ({} dims) in {}",
                embedding.model,
                embedding.dimensions,
                dir.display()
            ),
        );
    }
    CheckResult::error(
        "Local model",
        &format!("{} missing: {}", dir.display(), missing.join(", ")),
        &format!(
            "Export {} to ONNX into that directory, or set embedding.model_dir",
            embedding.model
        ),
    )
}

fn check_openai_api_key(key: Option<&str>) -> CheckResult {
    match key {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", mask_secret(key)))
        }
        Some("") | None => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Some(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
    }
}

fn check_index_api_key(key: Option<&str>) -> CheckResult {
    match key {
        Some(key) if !key.is_empty() => {
            CheckResult::ok("Pinecone API key", &format!("configured ({})", mask_secret(key)))
        }
        _ => CheckResult::error(
            "Pinecone API key",
            "not set",
            &format!(
                "Set index.api_key in the config file or export {}",
                PINECONE_API_KEY_ENV
            ),
        ),
    }
}

fn check_index_settings(settings: &Settings) -> CheckResult {
    let index = &settings.index;
    let target = match &index.host {
        Some(host) if !host.is_empty() => format!("{} at {}", index.index_name, host),
        _ => format!("{} in {}", index.index_name, index.environment),
    };

    if let Err(e) = settings.validate() {
        return CheckResult::error("Settings", &e.to_string(), "Fix the value in the config file");
    }
    CheckResult::ok(
        "Settings",
        &format!(
            "{} (top_k {}, {} attempts)",
            target, settings.search.top_k, settings.search.max_attempts
        ),
    )
}

async fn check_index_connection(settings: &Settings) -> CheckResult {
    let connector = match PineconeConnector::from_settings(&settings.index) {
        Ok(c) => c,
        Err(e) => {
            return CheckResult::error("Connection", &e.to_string(), "Check [index] settings")
        }
    };
    match connector.connect().await {
        Ok(_) => CheckResult::ok("Connection", "index host resolved"),
        Err(e) => CheckResult::warning(
            "Connection",
            &format!("could not resolve index host: {}", e),
            "Check index.environment and index.index_name, or set index.host",
        ),
    }
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            &format!("{} not found, using defaults", config_path.display()),
            "Create with: tubeseek config edit",
        )
    }
}

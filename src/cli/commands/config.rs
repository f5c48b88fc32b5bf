//! Config command: show, edit or locate the active settings file.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Run the config command against the file selected with `-c` (or the default).
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", describe_source(config_path));
            println!("{}", redacted_toml(&settings)?);
        }

        ConfigAction::Edit => {
            if ensure_config_file(&settings, config_path)? {
                Output::info(&format!("Created default config at {}", config_path.display()));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
            Output::info(&format!("Opening {} in {}...", config_path.display(), editor));

            match std::process::Command::new(&editor).arg(config_path).status() {
                Ok(s) if s.success() => {
                    // Catch typos now rather than on the next search.
                    let path = PathBuf::from(config_path);
                    match Settings::load_from(Some(&path)) {
                        Ok(_) => Output::success("Config saved."),
                        Err(e) => Output::warning(&format!("Config saved but invalid: {}", e)),
                    }
                }
                Ok(_) => Output::warning("Editor exited with non-zero status."),
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {}", config_path.display()));
                }
            }
        }

        ConfigAction::Path => println!("{}", config_path.display()),
    }

    Ok(())
}

/// Comment line naming where the shown settings came from.
fn describe_source(config_path: &Path) -> String {
    if config_path.exists() {
        format!("# {}", config_path.display())
    } else {
        format!("# defaults ({} does not exist)", config_path.display())
    }
}

/// Settings as TOML with secrets masked.
fn redacted_toml(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(&settings.redacted()).context("Failed to serialize config")
}

/// Write `settings` to `config_path` unless a file is already there.
/// Returns whether a file was created.
fn ensure_config_file(settings: &Settings, config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }
    settings
        .save_to(&PathBuf::from(config_path))
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(true)
}

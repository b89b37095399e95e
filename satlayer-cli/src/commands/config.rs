//! Configuration management CLI commands.
//!
//! Provides `config init`, `config path` and `config show`.

use clap::Subcommand;
use satlayer::config::{config_file_path, ConfigFile};
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a default configuration file if none exists
    Init {
        /// Overwrite an existing file with defaults
        #[arg(long)]
        force: bool,
    },

    /// Show the configuration file path
    Path,

    /// Show the effective configuration (file plus environment)
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<PathBuf>) -> Result<(), CliError> {
    let path = config_path.unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Init { force } => run_init(&path, force),
        ConfigCommands::Path => run_path(&path),
        ConfigCommands::Show => run_show(&path),
    }
}

fn run_init(path: &Path, force: bool) -> Result<(), CliError> {
    if force {
        ConfigFile::default().save_to(path)?;
        println!("Wrote default configuration to {}", path.display());
    } else if ConfigFile::ensure_exists_at(path)? {
        println!("Created {}", path.display());
    } else {
        println!("Configuration already exists at {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    println!();
    println!("Next: set access_token under [mapbox], or export MAPBOX_TOKEN.");
    Ok(())
}

fn run_path(path: &Path) -> Result<(), CliError> {
    println!("{}", path.display());
    Ok(())
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let mut config = ConfigFile::load_from(path)?;
    config.apply_env();

    println!("# {}", path.display());
    for line in render(&config) {
        println!("{}", line);
    }
    Ok(())
}

/// Effective settings as display lines, token masked.
fn render(config: &ConfigFile) -> Vec<String> {
    let mapbox = &config.mapbox;
    let acquisition = &config.acquisition;
    vec![
        "[mapbox]".to_string(),
        format!(
            "  access_token = {}",
            mask_token(mapbox.access_token.as_deref())
        ),
        format!("  style = {}", mapbox.style),
        format!("  zoom = {}", mapbox.zoom),
        format!("  size = {}", mapbox.size),
        String::new(),
        "[acquisition]".to_string(),
        format!("  base_dir = {}", acquisition.base_dir.display()),
        format!("  timeout = {}", acquisition.timeout),
        format!("  request_interval_ms = {}", acquisition.request_interval_ms),
        format!("  throttle_skipped = {}", acquisition.throttle_skipped),
        format!("  concurrency = {}", acquisition.concurrency),
        format!("  rate_limiter = {}", acquisition.rate_limiter),
        String::new(),
        "[logging]".to_string(),
        format!("  file = {}", config.logging.file.display()),
    ]
}

/// Show only the token's prefix.
fn mask_token(token: Option<&str>) -> String {
    match token {
        None => "(not set)".to_string(),
        Some(t) => {
            let prefix: String = t.chars().take(4).collect();
            if t.chars().count() <= 8 {
                "****".to_string()
            } else {
                format!("{}****", prefix)
            }
        }
    }
}

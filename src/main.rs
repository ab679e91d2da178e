//! Backtesting CLI application.

mod cli;

use anyhow::{Context, Result};
use bt_config::{load_config, AppConfig};
use bt_monitor::setup_logging;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // validate-config reports its own load errors
    let app_config = match cli.command {
        Commands::ValidateConfig => AppConfig::default(),
        _ => load_or_default(&cli.config)?,
    };

    let log_level = cli
        .log_level
        .map(|level| level.as_str().to_string())
        .unwrap_or_else(|| app_config.logging.level.clone());
    let json = cli.json_logs || app_config.logging.is_json();
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| app_config.logging.file.as_ref().map(Into::into));
    let _guard = setup_logging(&log_level, json, log_file.as_deref());

    match cli.command {
        Commands::Backtest(args) => cli::commands::backtest::run(args, &app_config).await,
        Commands::Strategies => cli::commands::strategies::run().await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}

fn load_or_default(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    load_config(path).with_context(|| format!("Failed to load config {}", path.display()))
}

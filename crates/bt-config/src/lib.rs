//! Configuration management.

mod settings;

pub use settings::{AppConfig, AppSettings, BacktestSettings, LoggingConfig};

use bt_core::types::StrategyParams;
use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// Environment variables override the file, e.g.
/// `BACKTEST__BACKTEST__FEE_PCT=0.075` or `BACKTEST__LOGGING__LEVEL=debug`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("BACKTEST")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

/// Parse a strategy parameter file: a flat TOML table of numbers.
pub fn parse_strategy_params(contents: &str) -> Result<StrategyParams, toml::de::Error> {
    toml::from_str(contents)
}

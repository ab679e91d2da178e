//! CLI definitions.

pub mod commands;

use bt_backtest::PositionMode;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "backtester")]
#[command(author, version, about = "Strategy backtesting and trade-simulation engine")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (defaults to the configured level)
    #[arg(short, long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Also write JSON logs to a daily-rolling file with this prefix
    #[arg(long, global = true, env = "BACKTEST_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a backtest over a CSV candle file
    Backtest(BacktestArgs),
    /// List available strategies
    Strategies,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    /// Strategy to backtest
    #[arg(short, long)]
    pub strategy: String,

    /// Symbol label for the data series
    #[arg(short = 'S', long, default_value = "DATA")]
    pub symbol: String,

    /// Data file (CSV)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Timeframe of the candles
    #[arg(short, long)]
    pub timeframe: Option<String>,

    /// Drop candles before this date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Drop candles after this date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Initial capital
    #[arg(long)]
    pub capital: Option<f64>,

    /// Fee percentage per notional
    #[arg(long)]
    pub fee_pct: Option<f64>,

    /// Baseline slippage percentage
    #[arg(long)]
    pub slippage_pct: Option<f64>,

    /// Position mode (single, accumulate)
    #[arg(long)]
    pub mode: Option<PositionMode>,

    /// Maximum entries per position in accumulate mode
    #[arg(long)]
    pub max_entries: Option<usize>,

    /// Percentage of capital committed per entry
    #[arg(long)]
    pub allocation_pct: Option<f64>,

    /// Let sell signals open short positions
    #[arg(long)]
    pub allow_short: bool,

    /// Scale slippage with volatility and order size
    #[arg(long)]
    pub dynamic_slippage: bool,

    /// In-sample fraction for walk-forward evaluation (0.5 to 0.9)
    #[arg(long)]
    pub split: Option<f64>,

    /// Strategy parameter file (TOML table of numbers)
    #[arg(long)]
    pub strategy_config: Option<PathBuf>,

    /// Strategy parameter override, e.g. -p fast_period=5
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, f64)>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Save the JSON report to file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Run a Monte Carlo resample with this many simulations
    #[arg(long)]
    pub monte_carlo: Option<usize>,

    /// Monte Carlo confidence level
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Monte Carlo seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the equity curve as CSV
    #[arg(long)]
    pub equity_csv: Option<PathBuf>,

    /// Write the trade list as CSV
    #[arg(long)]
    pub trades_csv: Option<PathBuf>,
}

fn parse_param(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for '{key}': {e}"))?;
    Ok((key.trim().to_string(), value))
}

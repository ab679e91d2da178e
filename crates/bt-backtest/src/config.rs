//! Backtest configuration.

use bt_core::{error::BacktestError, types::StrategyParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How repeated buy signals are treated while a long is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    /// One entry per position; further buys are dropped
    #[default]
    Single,
    /// DCA-style additive entries up to `max_entries`
    Accumulate,
}

impl fmt::Display for PositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionMode::Single => write!(f, "single"),
            PositionMode::Accumulate => write!(f, "accumulate"),
        }
    }
}

impl FromStr for PositionMode {
    type Err = BacktestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(PositionMode::Single),
            "accumulate" | "dca" => Ok(PositionMode::Accumulate),
            other => Err(BacktestError::InvalidConfig(format!(
                "Unknown position mode: {other}"
            ))),
        }
    }
}

/// Backtest configuration.
///
/// Percentages (`slippage_pct`, `fee_pct`, `allocation_pct`) are expressed in
/// percent, so `0.1` means 0.1%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub symbol: String,
    /// Timeframe label, used only for annualization
    pub timeframe: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub initial_capital: f64,
    /// Strategy identifier
    pub strategy: String,
    pub strategy_params: StrategyParams,
    /// Baseline slippage percentage
    pub slippage_pct: f64,
    /// Fee percentage per notional
    pub fee_pct: f64,
    /// In-sample fraction for the walk-forward split
    pub walk_forward_split: f64,
    pub position_mode: PositionMode,
    pub allow_short: bool,
    pub max_entries: Option<usize>,
    pub allocation_pct: Option<f64>,
    pub dynamic_slippage: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            timeframe: "1d".to_string(),
            start: None,
            end: None,
            initial_capital: 10_000.0,
            strategy: String::new(),
            strategy_params: StrategyParams::new(),
            slippage_pct: 0.05,
            fee_pct: 0.1,
            walk_forward_split: 0.7,
            position_mode: PositionMode::Single,
            allow_short: false,
            max_entries: None,
            allocation_pct: None,
            dynamic_slippage: false,
        }
    }
}

impl BacktestConfig {
    /// Allocation percentage with the mode-dependent default applied.
    pub fn allocation_pct(&self) -> f64 {
        self.allocation_pct.unwrap_or(match self.position_mode {
            PositionMode::Single => 100.0,
            PositionMode::Accumulate => 20.0,
        })
    }

    /// Entry cap with the mode-dependent default applied.
    pub fn max_entries(&self) -> usize {
        self.max_entries.unwrap_or(match self.position_mode {
            PositionMode::Single => 1,
            PositionMode::Accumulate => 5,
        })
    }

    /// Baseline slippage as a fraction.
    pub fn base_slippage(&self) -> f64 {
        self.slippage_pct / 100.0
    }

    /// Fee as a fraction of notional.
    pub fn fee_rate(&self) -> f64 {
        self.fee_pct / 100.0
    }

    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.initial_capital <= 0.0 || !self.initial_capital.is_finite() {
            return Err(BacktestError::InvalidConfig(
                "Initial capital must be positive".into(),
            ));
        }
        if !(0.5..=0.9).contains(&self.walk_forward_split) {
            return Err(BacktestError::InvalidConfig(format!(
                "Walk-forward split must be between 0.5 and 0.9, got {}",
                self.walk_forward_split
            )));
        }
        let allocation = self.allocation_pct();
        if allocation.is_nan() || allocation <= 0.0 || allocation > 100.0 {
            return Err(BacktestError::InvalidConfig(format!(
                "Allocation must be in (0, 100], got {allocation}"
            )));
        }
        if self.max_entries() == 0 {
            return Err(BacktestError::InvalidConfig(
                "Max entries must be at least 1".into(),
            ));
        }
        if self.fee_pct < 0.0 || self.slippage_pct < 0.0 {
            return Err(BacktestError::InvalidConfig(
                "Fee and slippage must not be negative".into(),
            ));
        }
        Ok(())
    }
}

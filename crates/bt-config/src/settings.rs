//! Configuration structures.

use bt_backtest::{BacktestConfig, MonteCarloConfig, PositionMode};
use bt_core::error::BacktestError;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub backtest: BacktestSettings,
    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,
}

impl AppConfig {
    /// Check that the backtest defaults form a runnable configuration.
    pub fn validate(&self) -> Result<(), BacktestError> {
        self.backtest.to_config().validate()
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "backtester".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Directory-qualified file prefix for daily-rolling logs
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Default parameters for backtest runs; CLI flags override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    pub default_capital: Decimal,
    /// Fee percentage per notional
    pub fee_pct: Decimal,
    /// Baseline slippage percentage
    pub slippage_pct: Decimal,
    pub timeframe: String,
    pub walk_forward_split: f64,
    pub position_mode: PositionMode,
    pub allow_short: bool,
    pub max_entries: Option<usize>,
    pub allocation_pct: Option<Decimal>,
    pub dynamic_slippage: bool,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            default_capital: dec!(10000),
            fee_pct: dec!(0.1),
            slippage_pct: dec!(0.05),
            timeframe: "1d".to_string(),
            walk_forward_split: 0.7,
            position_mode: PositionMode::Single,
            allow_short: false,
            max_entries: None,
            allocation_pct: None,
            dynamic_slippage: false,
        }
    }
}

impl BacktestSettings {
    /// Engine configuration seeded from these defaults.
    ///
    /// Decimal amounts that cannot be represented as `f64` become NaN and are
    /// rejected by [`BacktestConfig::validate`].
    pub fn to_config(&self) -> BacktestConfig {
        let to_f64 = |d: Decimal| d.to_f64().unwrap_or(f64::NAN);
        BacktestConfig {
            timeframe: self.timeframe.clone(),
            initial_capital: to_f64(self.default_capital),
            slippage_pct: to_f64(self.slippage_pct),
            fee_pct: to_f64(self.fee_pct),
            walk_forward_split: self.walk_forward_split,
            position_mode: self.position_mode,
            allow_short: self.allow_short,
            max_entries: self.max_entries,
            allocation_pct: self.allocation_pct.map(to_f64),
            dynamic_slippage: self.dynamic_slippage,
            ..Default::default()
        }
    }
}

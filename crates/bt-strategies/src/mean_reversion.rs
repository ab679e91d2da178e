//! Mean Reversion Strategy using Bollinger Bands.
//!
//! Buys when price touches the lower band (oversold), exits when %B returns
//! to the exit threshold. Tracks its own position flag, so every run needs a
//! fresh instance.

use bt_core::{
    error::StrategyError,
    traits::{Indicator, Strategy},
    types::{Candle, CandleSlice, PositionContext, Signal, StrategyParams},
};
use bt_indicators::{BollingerBands, BollingerOutput};
use serde::{Deserialize, Serialize};

/// Configuration for the Mean Reversion strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeanReversionConfig {
    /// Bollinger Bands period
    pub bb_period: usize,
    /// Bollinger Bands standard deviation multiplier
    pub bb_std_dev: f64,
    /// Entry threshold (%B value for entry, e.g., 0.05 = below 5%)
    pub entry_threshold: f64,
    /// Exit threshold (%B value for exit, e.g., 0.5 = at middle band)
    pub exit_threshold: f64,
    /// Use mean reversion for both long and short
    pub allow_short: bool,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            bb_period: 20,
            bb_std_dev: 2.0,
            entry_threshold: 0.05,
            exit_threshold: 0.5,
            allow_short: false,
        }
    }
}

impl MeanReversionConfig {
    pub fn from_params(params: &StrategyParams) -> Self {
        let d = Self::default();
        Self {
            bb_period: params.period_or("bb_period", d.bb_period),
            bb_std_dev: params.get_or("bb_std_dev", d.bb_std_dev),
            entry_threshold: params.get_or("entry_threshold", d.entry_threshold),
            exit_threshold: params.get_or("exit_threshold", d.exit_threshold),
            allow_short: params.flag_or("allow_short", d.allow_short),
        }
    }

    pub fn to_params(&self) -> StrategyParams {
        StrategyParams::new()
            .with("bb_period", self.bb_period as f64)
            .with("bb_std_dev", self.bb_std_dev)
            .with("entry_threshold", self.entry_threshold)
            .with("exit_threshold", self.exit_threshold)
            .with("allow_short", if self.allow_short { 1.0 } else { 0.0 })
    }

    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.bb_period < 2 {
            return Err(StrategyError::InvalidConfig(
                "BB period must be at least 2".into(),
            ));
        }
        if self.bb_std_dev <= 0.0 {
            return Err(StrategyError::InvalidConfig(
                "BB std dev must be positive".into(),
            ));
        }
        if !(0.0..=0.5).contains(&self.entry_threshold) {
            return Err(StrategyError::InvalidConfig(
                "Entry threshold must be between 0 and 0.5".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum PositionState {
    #[default]
    Flat,
    Long,
    Short,
}

/// Mean Reversion Strategy using Bollinger Bands.
#[derive(Debug, Default)]
pub struct MeanReversionStrategy {
    position: PositionState,
    signals_generated: usize,
}

impl MeanReversionStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of signals this instance has emitted.
    pub fn signals_generated(&self) -> usize {
        self.signals_generated
    }

    fn bands(config: &MeanReversionConfig, window: &[Candle]) -> Option<BollingerOutput> {
        BollingerBands::with_params(config.bb_period, config.bb_std_dev).latest(&window.closes())
    }

    fn with_bands(signal: Signal, bb: &BollingerOutput) -> Signal {
        signal
            .with_indicator("percent_b", bb.percent_b)
            .with_indicator("upper_band", bb.upper)
            .with_indicator("middle_band", bb.middle)
            .with_indicator("lower_band", bb.lower)
            .with_indicator("bandwidth", bb.bandwidth)
    }
}

impl Strategy for MeanReversionStrategy {
    fn name(&self) -> &str {
        "Mean Reversion"
    }

    fn description(&self) -> &str {
        "Trades reversions to the mean using Bollinger Bands"
    }

    fn analyze(
        &mut self,
        window: &[Candle],
        params: &StrategyParams,
        _position: &PositionContext,
    ) -> Option<Signal> {
        let config = MeanReversionConfig::from_params(params);
        if config.validate().is_err() {
            return None;
        }

        let bb = Self::bands(&config, window)?;
        let bar = window.last()?;
        let spread = bb.upper - bb.lower;

        let signal = match self.position {
            PositionState::Flat if bb.percent_b <= config.entry_threshold => {
                self.position = PositionState::Long;
                Self::with_bands(Signal::buy(bar.close), &bb)
                    .with_confidence(1.0 - bb.percent_b)
                    .with_levels(Some(bb.lower - spread * 0.1), Some(bb.middle))
                    .with_reason(format!(
                        "Price near lower band (%B: {:.2}%), expecting reversion to mean",
                        bb.percent_b * 100.0
                    ))
            }
            PositionState::Flat
                if config.allow_short && bb.percent_b >= 1.0 - config.entry_threshold =>
            {
                self.position = PositionState::Short;
                Self::with_bands(Signal::sell(bar.close), &bb)
                    .with_confidence(bb.percent_b)
                    .with_levels(Some(bb.upper + spread * 0.1), Some(bb.middle))
                    .with_reason(format!(
                        "Price near upper band (%B: {:.2}%), expecting reversion to mean",
                        bb.percent_b * 100.0
                    ))
            }
            PositionState::Long if bb.percent_b >= config.exit_threshold => {
                self.position = PositionState::Flat;
                Signal::sell(bar.close)
                    .with_confidence(0.8)
                    .with_indicator("percent_b", bb.percent_b)
                    .with_reason(format!(
                        "Price returned to mean (%B: {:.2}%)",
                        bb.percent_b * 100.0
                    ))
            }
            PositionState::Short if bb.percent_b <= config.exit_threshold => {
                self.position = PositionState::Flat;
                Signal::buy(bar.close)
                    .with_confidence(0.8)
                    .with_indicator("percent_b", bb.percent_b)
                    .with_reason(format!(
                        "Price returned to mean (%B: {:.2}%)",
                        bb.percent_b * 100.0
                    ))
            }
            _ => return None,
        };

        self.signals_generated += 1;
        Some(signal)
    }
}

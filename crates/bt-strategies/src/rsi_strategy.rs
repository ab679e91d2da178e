//! RSI-based Trading Strategy.
//!
//! Buys when RSI crosses above the oversold level and exits longs when it
//! crosses below the overbought level. Position awareness comes from the
//! engine's [`PositionContext`], so the instance itself holds no trade state.

use bt_core::{
    error::StrategyError,
    traits::{Indicator, Strategy},
    types::{Candle, CandleSlice, PositionContext, Signal, StrategyParams},
};
use bt_indicators::Rsi;
use serde::{Deserialize, Serialize};

/// Configuration for the RSI strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiConfig {
    /// RSI calculation period
    pub period: usize,
    /// Overbought threshold (exit longs, enter shorts)
    pub overbought: f64,
    /// Oversold threshold (enter longs, exit shorts)
    pub oversold: f64,
    /// Close a position once its unrealized loss reaches this percent (0 disables)
    pub stop_loss_pct: f64,
    /// Close a position after this many candles (0 disables)
    pub max_hold_candles: usize,
    pub allow_short: bool,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
            stop_loss_pct: 0.0,
            max_hold_candles: 0,
            allow_short: false,
        }
    }
}

impl RsiConfig {
    pub fn from_params(params: &StrategyParams) -> Self {
        let d = Self::default();
        Self {
            period: params.period_or("period", d.period),
            overbought: params.get_or("overbought", d.overbought),
            oversold: params.get_or("oversold", d.oversold),
            stop_loss_pct: params.get_or("stop_loss_pct", d.stop_loss_pct),
            max_hold_candles: params.period_or("max_hold_candles", d.max_hold_candles),
            allow_short: params.flag_or("allow_short", d.allow_short),
        }
    }

    pub fn to_params(&self) -> StrategyParams {
        StrategyParams::new()
            .with("period", self.period as f64)
            .with("overbought", self.overbought)
            .with("oversold", self.oversold)
            .with("stop_loss_pct", self.stop_loss_pct)
            .with("max_hold_candles", self.max_hold_candles as f64)
            .with("allow_short", if self.allow_short { 1.0 } else { 0.0 })
    }

    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.period < 2 {
            return Err(StrategyError::InvalidConfig(
                "RSI period must be at least 2".into(),
            ));
        }
        if self.overbought <= self.oversold {
            return Err(StrategyError::InvalidConfig(
                "Overbought must be greater than oversold".into(),
            ));
        }
        if self.overbought > 100.0 || self.oversold < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "RSI thresholds must be between 0 and 100".into(),
            ));
        }
        if self.stop_loss_pct < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "Stop loss must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// RSI-based Trading Strategy.
#[derive(Debug, Default)]
pub struct RsiStrategy;

impl RsiStrategy {
    pub fn new() -> Self {
        Self
    }

    fn confidence(rsi: f64) -> f64 {
        if rsi <= 20.0 || rsi >= 80.0 {
            0.9
        } else if rsi <= 30.0 || rsi >= 70.0 {
            0.7
        } else {
            0.5
        }
    }

    /// Exit triggered by the position itself rather than by RSI.
    fn risk_exit(config: &RsiConfig, position: &PositionContext) -> Option<String> {
        if !position.has_position {
            return None;
        }
        if config.stop_loss_pct > 0.0 && position.unrealized_pnl_pct <= -config.stop_loss_pct {
            return Some(format!(
                "Stop loss hit ({:.2}% unrealized)",
                position.unrealized_pnl_pct
            ));
        }
        if config.max_hold_candles > 0 && position.candles_held >= config.max_hold_candles {
            return Some(format!("Held for {} candles", position.candles_held));
        }
        None
    }
}

impl Strategy for RsiStrategy {
    fn name(&self) -> &str {
        "RSI Strategy"
    }

    fn description(&self) -> &str {
        "Trades RSI overbought/oversold reversals"
    }

    fn analyze(
        &mut self,
        window: &[Candle],
        params: &StrategyParams,
        position: &PositionContext,
    ) -> Option<Signal> {
        let config = RsiConfig::from_params(params);
        if config.validate().is_err() {
            return None;
        }

        let bar = window.last()?;

        if let Some(reason) = Self::risk_exit(&config, position) {
            let signal = if position.is_long() {
                Signal::sell(bar.close)
            } else {
                Signal::buy(bar.close)
            };
            return Some(signal.with_confidence(1.0).with_reason(reason));
        }

        let rsi = Rsi::new(config.period).calculate(&window.closes());
        let (prev, current) = match rsi.as_slice() {
            [.., prev, current] => (*prev, *current),
            _ => return None,
        };

        let crossed_up = prev <= config.oversold && current > config.oversold;
        let crossed_down = prev >= config.overbought && current < config.overbought;

        let signal = if crossed_up && !position.is_long() {
            Signal::buy(bar.close).with_reason(format!(
                "RSI ({:.1}) crossed above oversold level ({:.1})",
                current, config.oversold
            ))
        } else if crossed_down && (position.is_long() || config.allow_short) {
            Signal::sell(bar.close).with_reason(format!(
                "RSI ({:.1}) crossed below overbought level ({:.1})",
                current, config.overbought
            ))
        } else {
            return None;
        };

        Some(
            signal
                .with_confidence(Self::confidence(current))
                .with_indicator("rsi", current),
        )
    }
}

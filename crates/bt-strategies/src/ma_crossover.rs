//! Moving Average Crossover Strategy.
//!
//! Emits a buy when the fast MA crosses above the slow MA and a sell when it
//! crosses below.

use bt_core::{
    error::StrategyError,
    traits::Strategy,
    types::{Candle, CandleSlice, PositionContext, Signal, StrategyParams},
};
use bt_indicators::AverageKind;
use serde::{Deserialize, Serialize};

/// Configuration for the MA Crossover strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MACrossoverConfig {
    /// Fast moving average period
    pub fast_period: usize,
    /// Slow moving average period
    pub slow_period: usize,
    /// Use EMA instead of SMA
    pub use_ema: bool,
    /// Minimum crossover magnitude (fraction of the slow MA)
    pub signal_threshold: f64,
}

impl Default for MACrossoverConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            use_ema: true,
            signal_threshold: 0.001,
        }
    }
}

impl MACrossoverConfig {
    /// Read the configuration from a parameter map, filling in defaults.
    pub fn from_params(params: &StrategyParams) -> Self {
        let d = Self::default();
        Self {
            fast_period: params.period_or("fast_period", d.fast_period),
            slow_period: params.period_or("slow_period", d.slow_period),
            use_ema: params.flag_or("use_ema", d.use_ema),
            signal_threshold: params.get_or("signal_threshold", d.signal_threshold),
        }
    }

    pub fn to_params(&self) -> StrategyParams {
        StrategyParams::new()
            .with("fast_period", self.fast_period as f64)
            .with("slow_period", self.slow_period as f64)
            .with("use_ema", if self.use_ema { 1.0 } else { 0.0 })
            .with("signal_threshold", self.signal_threshold)
    }

    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        if self.signal_threshold < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "Signal threshold must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Moving Average Crossover Strategy.
#[derive(Debug, Default)]
pub struct MACrossoverStrategy {
    prev_fast: Option<f64>,
    prev_slow: Option<f64>,
}

impl MACrossoverStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn moving_average(config: &MACrossoverConfig, closes: &[f64], period: usize) -> Option<f64> {
        AverageKind::from_ema_flag(config.use_ema).latest(period, closes)
    }
}

impl Strategy for MACrossoverStrategy {
    fn name(&self) -> &str {
        "MA Crossover"
    }

    fn description(&self) -> &str {
        "Generates signals based on fast/slow moving average crossovers"
    }

    fn analyze(
        &mut self,
        window: &[Candle],
        params: &StrategyParams,
        _position: &PositionContext,
    ) -> Option<Signal> {
        let config = MACrossoverConfig::from_params(params);
        if config.validate().is_err() || window.len() < config.slow_period + 1 {
            return None;
        }

        let closes = window.closes();
        let fast = Self::moving_average(&config, &closes, config.fast_period)?;
        let slow = Self::moving_average(&config, &closes, config.slow_period)?;
        let bar = window.last()?;

        let previous = self.prev_fast.zip(self.prev_slow);
        self.prev_fast = Some(fast);
        self.prev_slow = Some(slow);

        let (prev_fast, prev_slow) = previous?;
        let magnitude = if slow != 0.0 {
            ((fast - slow) / slow).abs()
        } else {
            0.0
        };
        if magnitude < config.signal_threshold {
            return None;
        }

        let signal = if prev_fast <= prev_slow && fast > slow {
            Signal::buy(bar.close).with_reason(format!(
                "Bullish crossover: fast MA ({:.2}) crossed above slow MA ({:.2})",
                fast, slow
            ))
        } else if prev_fast >= prev_slow && fast < slow {
            Signal::sell(bar.close).with_reason(format!(
                "Bearish crossover: fast MA ({:.2}) crossed below slow MA ({:.2})",
                fast, slow
            ))
        } else {
            return None;
        };

        Some(
            signal
                .with_confidence(magnitude * 50.0)
                .with_indicator("fast_ma", fast)
                .with_indicator("slow_ma", slow)
                .with_indicator("crossover_magnitude", magnitude),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::candles;
    use bt_core::types::SignalAction;

    fn params() -> StrategyParams {
        StrategyParams::new()
            .with("fast_period", 3.0)
            .with("slow_period", 5.0)
            .with("use_ema", 0.0)
            .with("signal_threshold", 0.0)
    }

    fn run(strategy: &mut MACrossoverStrategy, prices: &[f64]) -> Vec<Signal> {
        let series = candles(prices);
        (1..=series.len())
            .filter_map(|end| strategy.analyze(&series[..end], &params(), &PositionContext::flat()))
            .collect()
    }

    #[test]
    fn test_config_validation() {
        assert!(MACrossoverConfig::default().validate().is_ok());

        let bad = MACrossoverConfig::from_params(
            &StrategyParams::new().with("fast_period", 30.0).with("slow_period", 20.0),
        );
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_bullish_crossover() {
        let mut strategy = MACrossoverStrategy::new();
        let signals = run(
            &mut strategy,
            &[100.0, 99.0, 98.0, 97.0, 96.0, 97.0, 99.0, 102.0, 105.0, 108.0],
        );

        assert!(signals.iter().any(|s| s.action == SignalAction::Buy));
        assert!(signals.iter().all(|s| s.action != SignalAction::Sell));
    }

    #[test]
    fn test_bearish_crossover() {
        let mut strategy = MACrossoverStrategy::new();
        let signals = run(
            &mut strategy,
            &[96.0, 97.0, 98.0, 99.0, 100.0, 99.0, 97.0, 94.0, 91.0, 88.0],
        );

        assert!(signals.iter().any(|s| s.action == SignalAction::Sell));
    }

    #[test]
    fn test_fresh_instance_needs_a_previous_reading() {
        let series = candles(&[100.0, 99.0, 98.0, 97.0, 96.0, 97.0, 99.0, 102.0]);
        let mut strategy = MACrossoverStrategy::new();

        // First evaluation only records the averages
        assert!(strategy
            .analyze(&series, &params(), &PositionContext::flat())
            .is_none());
        assert!(strategy.prev_fast.is_some());
    }
}

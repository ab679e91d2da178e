//! Volatility indicators.

use bt_core::traits::Indicator;
use bt_core::types::Candle;
use serde::{Deserialize, Serialize};

/// Average True Range with simple (non-exponential) averaging.
///
/// Each output is the arithmetic mean of `period` consecutive true ranges.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator. Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// True ranges for every candle that has a predecessor.
    pub fn true_ranges(candles: &[Candle]) -> Vec<f64> {
        candles
            .windows(2)
            .map(|w| w[1].true_range(Some(w[0].close)))
            .collect()
    }
}

impl Indicator for Atr {
    type Input = Candle;
    type Output = f64;

    fn calculate(&self, candles: &[Candle]) -> Vec<f64> {
        let n = self.period as f64;
        Self::true_ranges(candles)
            .windows(self.period)
            .map(|w| w.iter().sum::<f64>() / n)
            .collect()
    }

    /// One true range needs two candles.
    fn lookback(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "ATR"
    }
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerOutput {
    pub upper: f64,
    /// Middle band (SMA)
    pub middle: f64,
    pub lower: f64,
    /// (upper - lower) / middle
    pub bandwidth: f64,
    /// (price - lower) / (upper - lower)
    pub percent_b: f64,
}

/// Bollinger Bands: SMA with bands at a multiple of the population
/// standard deviation.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    /// Create Bollinger Bands with custom parameters.
    pub fn with_params(period: usize, std_dev_multiplier: f64) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        assert!(
            std_dev_multiplier > 0.0,
            "Std dev multiplier must be positive"
        );
        Self {
            period,
            std_dev_multiplier,
        }
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::with_params(20, 2.0)
    }
}

impl Indicator for BollingerBands {
    type Input = f64;
    type Output = BollingerOutput;

    fn calculate(&self, data: &[f64]) -> Vec<BollingerOutput> {
        if data.len() < self.period {
            return vec![];
        }

        let period_f64 = self.period as f64;

        data.windows(self.period)
            .map(|window| {
                let mean: f64 = window.iter().sum::<f64>() / period_f64;
                let variance: f64 =
                    window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period_f64;
                let band = self.std_dev_multiplier * variance.sqrt();
                let upper = mean + band;
                let lower = mean - band;
                let price = window[self.period - 1];

                BollingerOutput {
                    upper,
                    middle: mean,
                    lower,
                    bandwidth: if mean != 0.0 { (upper - lower) / mean } else { 0.0 },
                    percent_b: if upper != lower {
                        (price - lower) / (upper - lower)
                    } else {
                        0.5
                    },
                }
            })
            .collect()
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }
}

//! Moving averages over closing prices.

use bt_core::traits::Indicator;
use serde::{Deserialize, Serialize};

/// Arithmetic mean of the trailing `period` closes.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be positive");
        Self { period }
    }
}

impl Indicator for Sma {
    type Input = f64;
    type Output = f64;

    fn calculate(&self, closes: &[f64]) -> Vec<f64> {
        let n = self.period as f64;
        let Some(seed) = closes.get(..self.period) else {
            return Vec::new();
        };

        let mut running = seed.iter().sum::<f64>();
        let mut out = vec![running / n];
        out.extend(closes.windows(self.period + 1).map(|w| {
            running += w[self.period] - w[0];
            running / n
        }));
        out
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential average seeded with the SMA of the first `period` closes,
/// smoothing factor `2 / (period + 1)`.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "EMA period must be positive");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Indicator for Ema {
    type Input = f64;
    type Output = f64;

    fn calculate(&self, closes: &[f64]) -> Vec<f64> {
        let head = &closes[..self.period.min(closes.len())];
        let Some(seed) = Sma::new(self.period).calculate(head).pop() else {
            return Vec::new();
        };

        std::iter::once(seed)
            .chain(closes[self.period..].iter().scan(seed, |ema, &close| {
                *ema += self.alpha * (close - *ema);
                Some(*ema)
            }))
            .collect()
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }

    // The seed depends on the oldest closes, so the whole series is needed.
    fn latest(&self, closes: &[f64]) -> Option<f64> {
        self.calculate(closes).pop()
    }
}

/// Which average a crossover compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AverageKind {
    Simple,
    Exponential,
}

impl AverageKind {
    pub fn from_ema_flag(use_ema: bool) -> Self {
        if use_ema {
            AverageKind::Exponential
        } else {
            AverageKind::Simple
        }
    }

    /// Current value of this average over `closes`, if there are enough.
    pub fn latest(self, period: usize, closes: &[f64]) -> Option<f64> {
        match self {
            AverageKind::Simple => Sma::new(period).latest(closes),
            AverageKind::Exponential => Ema::new(period).latest(closes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOSES: [f64; 6] = [10.0, 12.0, 14.0, 13.0, 15.0, 18.0];

    #[test]
    fn test_sma_rolls_forward() {
        let values = Sma::new(3).calculate(&CLOSES);
        assert_eq!(values.len(), 4);
        assert!((values[0] - 12.0).abs() < 1e-10);
        assert!((values[1] - 13.0).abs() < 1e-10);
        assert!((values[3] - 46.0 / 3.0).abs() < 1e-10);
        assert_eq!(Sma::new(3).latest(&CLOSES), values.last().copied());
    }

    #[test]
    fn test_sma_short_series() {
        assert!(Sma::new(8).calculate(&CLOSES).is_empty());
        assert_eq!(Sma::new(8).latest(&CLOSES), None);
    }

    #[test]
    fn test_ema_seed_and_smoothing() {
        let ema = Ema::new(3);
        assert!((ema.alpha() - 0.5).abs() < 1e-12);

        let values = ema.calculate(&CLOSES);
        assert_eq!(values.len(), 4);
        // seed 12, then halfway toward each new close
        assert!((values[0] - 12.0).abs() < 1e-10);
        assert!((values[1] - 12.5).abs() < 1e-10);
        assert!((values[2] - 13.75).abs() < 1e-10);
        assert_eq!(ema.latest(&CLOSES), Some(values[3]));
    }

    #[test]
    fn test_average_kind_dispatch() {
        assert_eq!(AverageKind::from_ema_flag(true), AverageKind::Exponential);
        assert_eq!(AverageKind::Simple.latest(2, &CLOSES), Some(16.5));
        assert!(AverageKind::Exponential.latest(10, &CLOSES).is_none());
    }
}

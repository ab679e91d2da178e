//! Momentum indicators.

use bt_core::traits::Indicator;

/// Relative Strength Index (RSI) with Wilder smoothing.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator. 14 is the usual period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    fn value(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    }
}

impl Indicator for Rsi {
    type Input = f64;
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period {
            return vec![];
        }

        let period_f64 = self.period as f64;
        let (gains, losses): (Vec<f64>, Vec<f64>) = data
            .windows(2)
            .map(|w| {
                let change = w[1] - w[0];
                (change.max(0.0), (-change).max(0.0))
            })
            .unzip();

        let mut avg_gain = gains[..self.period].iter().sum::<f64>() / period_f64;
        let mut avg_loss = losses[..self.period].iter().sum::<f64>() / period_f64;

        let mut result = Vec::with_capacity(gains.len() - self.period + 1);
        result.push(Self::value(avg_gain, avg_loss));

        for (gain, loss) in gains[self.period..].iter().zip(&losses[self.period..]) {
            avg_gain = (avg_gain * (period_f64 - 1.0) + gain) / period_f64;
            avg_loss = (avg_loss * (period_f64 - 1.0) + loss) / period_f64;
            result.push(Self::value(avg_gain, avg_loss));
        }

        result
    }

    fn lookback(&self) -> usize {
        self.period + 1
    }

    // Wilder smoothing carries state from the first close onward.
    fn latest(&self, data: &[f64]) -> Option<f64> {
        self.calculate(data).pop()
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

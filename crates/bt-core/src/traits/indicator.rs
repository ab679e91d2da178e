//! Indicator trait.

use crate::error::IndicatorError;

/// A rolling computation over a series.
///
/// `Input` is what one element of the series is (`f64` closes for most
/// indicators, whole candles for range-based ones) and `Output` is one value
/// per complete window. Output `k` covers inputs `k..k + lookback()`.
pub trait Indicator: Send + Sync {
    type Input;
    type Output;

    /// All outputs for `data`, oldest first. Empty when `data` is shorter
    /// than [`lookback`](Indicator::lookback).
    fn calculate(&self, data: &[Self::Input]) -> Vec<Self::Output>;

    /// Inputs consumed by the first output.
    fn lookback(&self) -> usize;

    fn name(&self) -> &str;

    fn ensure_enough(&self, data: &[Self::Input]) -> Result<(), IndicatorError> {
        let required = self.lookback();
        if data.len() < required {
            return Err(IndicatorError::InsufficientData {
                required,
                available: data.len(),
            });
        }
        Ok(())
    }

    /// Output for the newest window only.
    ///
    /// Only the trailing `lookback()` inputs are handed to `calculate`, so the
    /// cost does not grow with the length of `data`. Indicators whose value
    /// depends on the whole history (exponential smoothing) override this.
    fn latest(&self, data: &[Self::Input]) -> Option<Self::Output> {
        self.ensure_enough(data).ok()?;
        let tail = &data[data.len() - self.lookback()..];
        self.calculate(tail).pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Highest value over a fixed window.
    struct RollingMax(usize);

    impl Indicator for RollingMax {
        type Input = f64;
        type Output = f64;

        fn calculate(&self, data: &[f64]) -> Vec<f64> {
            data.windows(self.0)
                .map(|w| w.iter().copied().fold(f64::MIN, f64::max))
                .collect()
        }

        fn lookback(&self) -> usize {
            self.0
        }

        fn name(&self) -> &str {
            "max"
        }
    }

    #[test]
    fn test_ensure_enough_reports_counts() {
        let err = RollingMax(4).ensure_enough(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::InsufficientData { required: 4, available: 2 }
        ));
        assert!(RollingMax(2).ensure_enough(&[1.0, 2.0]).is_ok());
    }

    #[test]
    fn test_latest_looks_at_tail() {
        let indicator = RollingMax(2);
        assert_eq!(indicator.latest(&[9.0, 1.0, 3.0, 2.0]), Some(3.0));
        assert_eq!(indicator.latest(&[5.0]), None);
    }
}

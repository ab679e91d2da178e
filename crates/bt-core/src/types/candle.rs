//! OHLCV candle type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One fixed-interval price bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume
    pub volume: f64,
}

impl Candle {
    /// Create a new candle.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// True range against the previous close.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => {
                let hl = self.high - self.low;
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => self.high - self.low,
        }
    }
}

/// Column extraction over a window of candles.
pub trait CandleSlice {
    fn closes(&self) -> Vec<f64>;
    fn volumes(&self) -> Vec<f64>;
}

impl CandleSlice for [Candle] {
    fn closes(&self) -> Vec<f64> {
        self.iter().map(|c| c.close).collect()
    }

    fn volumes(&self) -> Vec<f64> {
        self.iter().map(|c| c.volume).collect()
    }
}

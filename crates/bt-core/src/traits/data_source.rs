//! Candle source trait.

use crate::error::DataError;
use crate::types::{Candle, Timeframe};
use async_trait::async_trait;

/// Trait for historical candle sources.
///
/// The engine never fetches data itself; callers load a series through a
/// source and hand the resulting slice to the simulation.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Load the full history for a symbol, ordered from oldest to newest.
    async fn load(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource(Vec<Candle>);

    #[async_trait]
    impl CandleSource for StaticSource {
        async fn load(&self, _symbol: &str, _timeframe: Timeframe) -> Result<Vec<Candle>, DataError> {
            if self.0.is_empty() {
                return Err(DataError::NoDataAvailable("empty".into()));
            }
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticSource(vec![Candle::new(1, 1.0, 1.0, 1.0, 1.0, 1.0)]);
        let candles = source.load("TEST", Timeframe::Daily).await.unwrap();
        assert_eq!(candles.len(), 1);

        let empty = StaticSource(vec![]);
        assert!(empty.load("TEST", Timeframe::Daily).await.is_err());
    }
}

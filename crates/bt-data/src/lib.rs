//! Historical candle sources.

mod csv_source;

pub use csv_source::CsvCandleSource;

use bt_core::error::DataError;
use bt_core::traits::CandleSource;
use bt_core::types::{Candle, Timeframe};
use std::path::Path;

/// Load candles from a CSV file.
pub async fn load_csv(
    path: impl AsRef<Path>,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<Vec<Candle>, DataError> {
    let source = CsvCandleSource::new(path)?;
    source.load(symbol, timeframe).await
}

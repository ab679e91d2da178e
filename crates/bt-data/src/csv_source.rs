//! CSV candle source.

use async_trait::async_trait;
use bt_core::error::DataError;
use bt_core::traits::CandleSource;
use bt_core::types::{Candle, Timeframe};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Date",
        alias = "date",
        alias = "timestamp",
        alias = "Timestamp",
        alias = "time",
        alias = "open_time"
    )]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Candle source backed by one CSV file per series.
///
/// The file is read in full on every [`load`](CandleSource::load); symbol and
/// timeframe are only used for logging.
#[derive(Debug, Clone)]
pub struct CsvCandleSource {
    path: PathBuf,
}

impl CsvCandleSource {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NoDataAvailable(format!(
                "{} does not exist",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse CSV bytes into candles sorted by timestamp.
    ///
    /// Duplicate timestamps keep the last row.
    pub fn parse(bytes: &[u8]) -> Result<Vec<Candle>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let mut candles = Vec::new();
        for (row, result) in reader.deserialize().enumerate() {
            let record: CsvRecord =
                result.map_err(|e| DataError::ParseError(format!("row {}: {e}", row + 1)))?;

            let values = [record.open, record.high, record.low, record.close, record.volume];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(DataError::ParseError(format!(
                    "row {}: non-finite value",
                    row + 1
                )));
            }

            candles.push(Candle::new(
                parse_timestamp(&record.date)?,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ));
        }

        candles.sort_by_key(|c| c.timestamp);
        let before = candles.len();
        candles.reverse();
        candles.dedup_by_key(|c| c.timestamp);
        candles.reverse();
        if candles.len() != before {
            warn!(dropped = before - candles.len(), "Duplicate timestamps in CSV");
        }

        Ok(candles)
    }
}

#[async_trait]
impl CandleSource for CsvCandleSource {
    async fn load(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>, DataError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let candles = Self::parse(&bytes)?;
        if candles.is_empty() {
            return Err(DataError::NoDataAvailable(format!(
                "{} contains no rows",
                self.path.display()
            )));
        }

        debug!(
            symbol,
            %timeframe,
            path = %self.path.display(),
            candles = candles.len(),
            "Loaded candles from CSV"
        );
        Ok(candles)
    }
}

/// Parse various timestamp formats into unix milliseconds.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.timestamp_millis());
    }

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc().timestamp_millis());
            }
        }
    }

    // Unix timestamp; more than 10 digits means milliseconds
    if let Ok(ts) = date_str.parse::<i64>() {
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {}",
        date_str
    )))
}

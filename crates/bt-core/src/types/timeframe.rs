//! Timeframe definitions and annualization factors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timeframe for candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "3m")]
    Minute3,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "2h")]
    Hour2,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "6h")]
    Hour6,
    #[serde(rename = "8h")]
    Hour8,
    #[serde(rename = "12h")]
    Hour12,
    #[serde(rename = "1d")]
    #[default]
    Daily,
    #[serde(rename = "3d")]
    Day3,
    #[serde(rename = "1w")]
    Weekly,
    /// Monthly candles. The label is case-sensitive ("1M", not "1m").
    #[serde(rename = "1M")]
    Monthly,
}

impl Timeframe {
    /// Number of candles of this timeframe in a calendar year.
    ///
    /// Markets are assumed to trade around the clock.
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Timeframe::Minute1 => 525_600.0,
            Timeframe::Minute3 => 175_200.0,
            Timeframe::Minute5 => 105_120.0,
            Timeframe::Minute15 => 35_040.0,
            Timeframe::Minute30 => 17_520.0,
            Timeframe::Hour1 => 8_760.0,
            Timeframe::Hour2 => 4_380.0,
            Timeframe::Hour4 => 2_190.0,
            Timeframe::Hour6 => 1_460.0,
            Timeframe::Hour8 => 1_095.0,
            Timeframe::Hour12 => 730.0,
            Timeframe::Daily => 365.0,
            Timeframe::Day3 => 365.0 / 3.0,
            Timeframe::Weekly => 52.0,
            Timeframe::Monthly => 12.0,
        }
    }
}

/// Annualization factor for a free-form timeframe label.
///
/// Known labels map through [`Timeframe`]. Unknown labels ending in `m`
/// fall back to 12 and anything else falls back to 365.
pub fn periods_per_year(label: &str) -> f64 {
    match label.parse::<Timeframe>() {
        Ok(tf) => tf.periods_per_year(),
        Err(_) if label.ends_with('m') => 12.0,
        Err(_) => 365.0,
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute3 => "3m",
            Timeframe::Minute5 => "5m",
            Timeframe::Minute15 => "15m",
            Timeframe::Minute30 => "30m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour2 => "2h",
            Timeframe::Hour4 => "4h",
            Timeframe::Hour6 => "6h",
            Timeframe::Hour8 => "8h",
            Timeframe::Hour12 => "12h",
            Timeframe::Daily => "1d",
            Timeframe::Day3 => "3d",
            Timeframe::Weekly => "1w",
            Timeframe::Monthly => "1M",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "1M" must be matched before lowercasing or it collapses into "1m"
        if s == "1M" {
            return Ok(Timeframe::Monthly);
        }
        match s.to_lowercase().as_str() {
            "1m" | "1min" | "minute" => Ok(Timeframe::Minute1),
            "3m" | "3min" => Ok(Timeframe::Minute3),
            "5m" | "5min" => Ok(Timeframe::Minute5),
            "15m" | "15min" => Ok(Timeframe::Minute15),
            "30m" | "30min" => Ok(Timeframe::Minute30),
            "1h" | "1hour" | "hour" | "hourly" => Ok(Timeframe::Hour1),
            "2h" => Ok(Timeframe::Hour2),
            "4h" | "4hour" => Ok(Timeframe::Hour4),
            "6h" => Ok(Timeframe::Hour6),
            "8h" => Ok(Timeframe::Hour8),
            "12h" => Ok(Timeframe::Hour12),
            "1d" | "day" | "daily" => Ok(Timeframe::Daily),
            "3d" => Ok(Timeframe::Day3),
            "1w" | "week" | "weekly" => Ok(Timeframe::Weekly),
            "month" | "monthly" => Ok(Timeframe::Monthly),
            _ => Err(format!("Invalid timeframe: {}", s)),
        }
    }
}

//! Technical indicators.
//!
//! - Moving averages (SMA, EMA)
//! - Momentum (RSI)
//! - Volatility (simple ATR, Bollinger Bands)
//! - Volume averages

pub mod momentum;
pub mod moving_average;
pub mod volatility;
pub mod volume;

pub use momentum::Rsi;
pub use moving_average::{AverageKind, Ema, Sma};
pub use volatility::{Atr, BollingerBands, BollingerOutput};
pub use volume::average_volume;

//! Core data types for the backtesting engine.

mod candle;
mod params;
mod position;
mod signal;
mod timeframe;

pub use candle::{Candle, CandleSlice};
pub use params::StrategyParams;
pub use position::{PositionContext, PositionSide};
pub use signal::{Signal, SignalAction, SignalMetadata};
pub use timeframe::{periods_per_year, Timeframe};

//! Trading strategy implementations.
//!
//! Strategies read their numeric parameters from [`StrategyParams`] on every
//! call and keep only per-run memory in the instance. The registry hands out
//! factories so every backtest run gets its own instance.
//!
//! [`StrategyParams`]: bt_core::types::StrategyParams

mod ma_crossover;
mod mean_reversion;
mod registry;
mod rsi_strategy;

pub use ma_crossover::{MACrossoverConfig, MACrossoverStrategy};
pub use mean_reversion::{MeanReversionConfig, MeanReversionStrategy};
pub use registry::{StrategyInfo, StrategyRegistry};
pub use rsi_strategy::{RsiConfig, RsiStrategy};

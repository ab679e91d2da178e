//! Core traits for the backtesting engine.

mod data_source;
mod indicator;
mod strategy;

pub use data_source::CandleSource;
pub use indicator::Indicator;
pub use strategy::{factory, FnStrategy, Strategy, StrategyFactory};

//! Core types and traits for the backtesting engine.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Candle, Timeframe)
//! - Trading signals and the position context handed to strategies
//! - Core traits for strategies, indicators, and candle sources

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;

//! Backtesting engine.
//!
//! Replays a candle series against a [`Strategy`](bt_core::traits::Strategy),
//! simulates fills with fee and slippage costs, and reduces the run to a
//! [`MetricsSet`]. [`run_backtest`] adds the walk-forward split and
//! [`run_monte_carlo`] resamples the resulting trade list.

mod config;
mod engine;
mod metrics;
mod monte_carlo;
mod position;
mod report;
mod slippage;
mod walk_forward;

pub use config::{BacktestConfig, PositionMode};
pub use engine::{BacktestEngine, DrawdownPoint, EquityPoint, SimulationOutput, LOOKBACK};
pub use metrics::{calculate_metrics, MetricsSet, MAX_ANNUALIZED_RETURN_PCT};
pub use monte_carlo::{
    run_monte_carlo, run_monte_carlo_seeded, HistogramBucket, MonteCarloConfig, MonteCarloResult,
};
pub use position::{ActivePosition, ClosedTrade, EntryFill, Ledger, PositionEntry};
pub use report::BacktestReport;
pub use slippage::{calculate_dynamic_slippage, market_inputs, MarketInputs, MAX_SLIPPAGE};
pub use walk_forward::{run_backtest, BacktestResult};

//! Walk-forward orchestration.

use bt_core::error::BacktestError;
use bt_core::traits::StrategyFactory;
use bt_core::types::Candle;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::BacktestConfig;
use crate::engine::{BacktestEngine, DrawdownPoint, EquityPoint, SimulationOutput};
use crate::metrics::MetricsSet;
use crate::position::ClosedTrade;

/// In-sample segments must be longer than this to be evaluated.
const MIN_IN_SAMPLE: usize = 50;
/// Out-of-sample segments must be longer than this to be evaluated.
const MIN_OUT_OF_SAMPLE: usize = 20;

/// Full-sample run plus optional walk-forward split metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub config: BacktestConfig,
    pub metrics: MetricsSet,
    pub trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown_curve: Vec<DrawdownPoint>,
    pub final_capital: f64,
    /// Present only when both split segments are large enough
    pub in_sample: Option<MetricsSet>,
    pub out_of_sample: Option<MetricsSet>,
}

/// Run the full series and, when the split allows, the in-sample prefix and
/// the out-of-sample suffix.
///
/// Each run gets its own strategy instance from `factory`, so the three runs
/// are independent and execute in parallel.
pub fn run_backtest(
    candles: &[Candle],
    config: &BacktestConfig,
    factory: &StrategyFactory,
) -> Result<BacktestResult, BacktestError> {
    config.validate()?;

    let engine = BacktestEngine::new(config);
    let split = (candles.len() as f64 * config.walk_forward_split).floor() as usize;
    let (prefix, suffix) = candles.split_at(split.min(candles.len()));
    let evaluate_split = prefix.len() > MIN_IN_SAMPLE && suffix.len() > MIN_OUT_OF_SAMPLE;

    info!(
        symbol = %config.symbol,
        strategy = %config.strategy,
        candles = candles.len(),
        split,
        evaluate_split,
        "Running backtest"
    );

    let run = |series: &[Candle]| -> SimulationOutput {
        let mut strategy = factory();
        engine.run(series, strategy.as_mut())
    };

    let (full, (in_sample, out_of_sample)) = rayon::join(
        || run(candles),
        || {
            if evaluate_split {
                rayon::join(|| Some(run(prefix)), || Some(run(suffix)))
            } else {
                (None, None)
            }
        },
    );

    Ok(BacktestResult {
        config: config.clone(),
        metrics: full.metrics,
        trades: full.trades,
        equity_curve: full.equity_curve,
        drawdown_curve: full.drawdown_curve,
        final_capital: full.final_capital,
        in_sample: in_sample.map(|out| out.metrics),
        out_of_sample: out_of_sample.map(|out| out.metrics),
    })
}

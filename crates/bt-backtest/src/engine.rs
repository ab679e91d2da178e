//! Backtesting engine.

use bt_core::traits::Strategy;
use bt_core::types::{periods_per_year, Candle, PositionSide, SignalAction};
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::config::{BacktestConfig, PositionMode};
use crate::metrics::{calculate_metrics, MetricsSet};
use crate::position::{ClosedTrade, Ledger};
use crate::slippage::{calculate_dynamic_slippage, market_inputs};

/// Candles handed to the strategy on every evaluation. The first evaluation
/// happens at this index.
pub const LOOKBACK: usize = 100;

/// Trailing candles used to estimate execution-time slippage.
const SLIPPAGE_WINDOW: usize = 30;

/// Mark-to-market equity at a candle's close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: i64,
    pub equity: f64,
}

/// Percentage decline from the running equity peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    pub timestamp: i64,
    pub drawdown_pct: f64,
}

/// Everything one pass over a candle series produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub metrics: MetricsSet,
    pub trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown_curve: Vec<DrawdownPoint>,
    pub final_capital: f64,
}

/// Single-series simulation loop.
///
/// A signal produced from the window ending at candle `i` is executed at the
/// open of candle `i + 1`. A signal produced at the last candle is never
/// executed; an open position is liquidated at the last close instead.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    config: BacktestConfig,
    base_slippage: f64,
    fee_rate: f64,
    periods_per_year: f64,
}

impl BacktestEngine {
    /// Engine with costs and annualization derived from `config`.
    pub fn new(config: &BacktestConfig) -> Self {
        Self::with_costs(
            config,
            config.base_slippage(),
            config.fee_rate(),
            periods_per_year(&config.timeframe),
        )
    }

    /// Engine with explicit slippage and fee fractions and annualization factor.
    pub fn with_costs(
        config: &BacktestConfig,
        base_slippage: f64,
        fee_rate: f64,
        periods_per_year: f64,
    ) -> Self {
        Self {
            config: config.clone(),
            base_slippage,
            fee_rate,
            periods_per_year,
        }
    }

    /// Run one pass over `candles` with a freshly constructed strategy.
    pub fn run(&self, candles: &[Candle], strategy: &mut dyn Strategy) -> SimulationOutput {
        let initial_capital = self.config.initial_capital;
        let params = &self.config.strategy_params;
        let evaluated = candles.len().saturating_sub(LOOKBACK);

        info!(
            strategy = strategy.name(),
            candles = candles.len(),
            evaluated,
            "Starting simulation"
        );

        let mut ledger = Ledger::new(initial_capital, self.fee_rate);
        let mut pending: Option<SignalAction> = None;
        let mut peak = initial_capital;
        let mut equity_curve = Vec::with_capacity(evaluated);
        let mut drawdown_curve = Vec::with_capacity(evaluated);

        for i in LOOKBACK..candles.len() {
            let candle = &candles[i];

            if let Some(action) = pending.take() {
                let slippage = self.execution_slippage(candles, i, ledger.capital());
                self.execute(&mut ledger, action, candle, i, slippage);
            }

            let equity = ledger.equity(candle.close);
            peak = peak.max(equity);
            let drawdown_pct = if peak > 0.0 {
                (peak - equity) / peak * 100.0
            } else {
                0.0
            };
            equity_curve.push(EquityPoint {
                timestamp: candle.timestamp,
                equity,
            });
            drawdown_curve.push(DrawdownPoint {
                timestamp: candle.timestamp,
                drawdown_pct,
            });

            let context = ledger.context(i, candle.close);
            let window = &candles[i + 1 - LOOKBACK..=i];
            pending = strategy
                .analyze(window, params, &context)
                .map(|signal| signal.action);
        }

        if let (Some(side), Some(last)) = (ledger.side(), candles.last()) {
            let price = match side {
                PositionSide::Long => last.close * (1.0 - self.base_slippage),
                PositionSide::Short => last.close * (1.0 + self.base_slippage),
            };
            ledger.close(price, last.timestamp);
        }

        let (final_capital, trades) = ledger.into_parts();
        let metrics = calculate_metrics(
            &trades,
            initial_capital,
            final_capital,
            &equity_curve,
            self.periods_per_year,
        );

        info!(
            trades = trades.len(),
            final_capital,
            total_return_pct = metrics.total_return_pct,
            "Simulation complete"
        );

        SimulationOutput {
            metrics,
            trades,
            equity_curve,
            drawdown_curve,
            final_capital,
        }
    }

    /// Slippage fraction for an execution at the open of candle `i`.
    fn execution_slippage(&self, candles: &[Candle], i: usize, capital: f64) -> f64 {
        if !self.config.dynamic_slippage {
            return self.base_slippage;
        }

        let start = (i + 1).saturating_sub(SLIPPAGE_WINDOW);
        let inputs = market_inputs(&candles[start..=i]);
        if inputs.is_empty() {
            return self.base_slippage;
        }

        let candle = &candles[i];
        let order_notional = capital * self.config.allocation_pct() / 100.0;
        calculate_dynamic_slippage(
            self.base_slippage,
            inputs.atr,
            candle.open,
            candle.volume,
            inputs.avg_volume,
            order_notional,
        )
    }

    fn execute(
        &self,
        ledger: &mut Ledger,
        action: SignalAction,
        candle: &Candle,
        index: usize,
        slippage: f64,
    ) {
        let buy_price = candle.open * (1.0 + slippage);
        let sell_price = candle.open * (1.0 - slippage);
        let allocation = self.config.allocation_pct();

        match action {
            SignalAction::Buy => {
                if ledger.side() == Some(PositionSide::Short) {
                    ledger.close(buy_price, candle.timestamp);
                }
                let can_add = |entries: usize| {
                    self.config.position_mode == PositionMode::Accumulate
                        && entries < self.config.max_entries()
                };
                match ledger.position().map(|p| p.entry_count()) {
                    None => {
                        ledger.enter(PositionSide::Long, allocation, buy_price, candle.timestamp, index);
                    }
                    Some(entries) if can_add(entries) => {
                        ledger.enter(PositionSide::Long, allocation, buy_price, candle.timestamp, index);
                    }
                    Some(entries) => trace!(entries, index, "Buy signal dropped"),
                }
            }
            SignalAction::Sell => match ledger.side() {
                Some(PositionSide::Long) => {
                    ledger.close(sell_price, candle.timestamp);
                }
                None if self.config.allow_short => {
                    ledger.enter(PositionSide::Short, allocation, sell_price, candle.timestamp, index);
                }
                _ => trace!(index, "Sell signal dropped"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_core::traits::FnStrategy;
    use bt_core::types::{PositionContext, Signal, StrategyParams};

    fn generate_test_data(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let price = 100.0 + (i as f64 * 0.5).sin() * 10.0;
                Candle::new(
                    i as i64 * 86_400_000,
                    price,
                    price + 2.0,
                    price - 2.0,
                    price + 1.0,
                    1_000_000.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_short_series_yields_empty_run() {
        let engine = BacktestEngine::new(&BacktestConfig::default());
        let mut strategy = FnStrategy::new(
            "always-buy",
            |w: &[Candle], _: &StrategyParams, _: &PositionContext| w.last().map(|c| Signal::buy(c.close)),
        );

        let out = engine.run(&generate_test_data(60), &mut strategy);
        assert!(out.trades.is_empty());
        assert!(out.equity_curve.is_empty());
        assert_eq!(out.final_capital, 10_000.0);
        assert_eq!(out.metrics, MetricsSet::default());
    }

    #[test]
    fn test_window_is_trailing_lookback() {
        let candles = generate_test_data(130);
        let engine = BacktestEngine::new(&BacktestConfig::default());
        let mut seen = Vec::new();
        let mut strategy = FnStrategy::new(
            "probe",
            |w: &[Candle], _: &StrategyParams, _: &PositionContext| {
                seen.push((w.len(), w.last().map(|c| c.timestamp)));
                None
            },
        );

        let out = engine.run(&candles, &mut strategy);

        assert_eq!(seen.len(), 30);
        assert!(seen.iter().all(|(len, _)| *len == LOOKBACK));
        assert_eq!(seen[0].1, Some(candles[100].timestamp));
        assert_eq!(out.equity_curve.len(), 30);
    }

    #[test]
    fn test_forced_liquidation_uses_base_slippage() {
        let candles = generate_test_data(120);
        let config = BacktestConfig {
            slippage_pct: 1.0,
            fee_pct: 0.0,
            ..Default::default()
        };
        let engine = BacktestEngine::new(&config);
        let mut strategy = FnStrategy::new(
            "buy-once",
            |w: &[Candle], _: &StrategyParams, ctx: &PositionContext| {
                (!ctx.has_position).then(|| Signal::buy(w[w.len() - 1].close))
            },
        );

        let out = engine.run(&candles, &mut strategy);
        assert_eq!(out.trades.len(), 1);

        let last = candles.last().unwrap();
        let trade = &out.trades[0];
        assert!((trade.exit_price - last.close * 0.99).abs() < 1e-9);
        assert_eq!(trade.exit_time, last.timestamp);
        assert!((trade.entry_price - candles[101].open * 1.01).abs() < 1e-9);
    }
}

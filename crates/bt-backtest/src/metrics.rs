//! Performance metrics.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::engine::EquityPoint;
use crate::position::ClosedTrade;

const MS_PER_DAY: f64 = 86_400_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Ceiling for the annualized return in percent. Compounding a large gain
/// over a few days otherwise overflows to infinity.
pub const MAX_ANNUALIZED_RETURN_PCT: f64 = 1e9;

/// Summary statistics of one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSet {
    /// Final minus initial capital
    pub total_return: f64,
    pub total_return_pct: f64,
    /// Compounded yearly return in percent
    pub annualized_return: f64,
    /// Largest peak-to-trough equity decline in currency
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// Percentage of trades with positive P&L
    pub win_rate: f64,
    /// Gross profit / gross loss; infinite when there are no losses
    pub profit_factor: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub avg_win: f64,
    /// Mean P&L of non-winning trades (zero or negative)
    pub avg_loss: f64,
    /// Mean holding time in hours
    pub avg_hold_time: f64,
    pub expectancy: f64,
    pub calmar_ratio: f64,
}

/// Reduce a run to its [`MetricsSet`].
///
/// `periods_per_year` scales the per-step Sharpe and Sortino ratios; the
/// annualized return uses calendar time from the equity curve instead.
pub fn calculate_metrics(
    trades: &[ClosedTrade],
    initial_capital: f64,
    final_capital: f64,
    equity_curve: &[EquityPoint],
    periods_per_year: f64,
) -> MetricsSet {
    let total_return = final_capital - initial_capital;
    let total_return_pct = ratio(total_return, initial_capital) * 100.0;

    let (wins, losses): (Vec<&ClosedTrade>, Vec<&ClosedTrade>) =
        trades.iter().partition(|t| t.is_win());
    let gross_profit: f64 = wins.iter().map(|t| t.pnl).sum();
    let gross_loss: f64 = losses.iter().map(|t| t.pnl.abs()).sum();

    let win_rate = ratio(wins.len() as f64, trades.len() as f64) * 100.0;
    let avg_win = ratio(gross_profit, wins.len() as f64);
    let avg_loss = ratio(losses.iter().map(|t| t.pnl).sum(), losses.len() as f64);

    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let returns = step_returns(equity_curve);
    let scale = periods_per_year.max(0.0).sqrt();
    let (sharpe_ratio, sortino_ratio) = risk_ratios(&returns, scale);
    let (max_drawdown, max_drawdown_pct) = max_drawdown(equity_curve);

    let annualized_return = annualized_return(initial_capital, final_capital, equity_curve);
    let calmar_ratio = if max_drawdown_pct > 0.0 {
        annualized_return / max_drawdown_pct
    } else {
        0.0
    };

    let avg_hold_time = ratio(
        trades.iter().map(|t| t.duration_ms() as f64).sum::<f64>() / MS_PER_HOUR,
        trades.len() as f64,
    );

    MetricsSet {
        total_return,
        total_return_pct,
        annualized_return,
        max_drawdown,
        max_drawdown_pct,
        sharpe_ratio,
        sortino_ratio,
        win_rate,
        profit_factor,
        total_trades: trades.len(),
        winning_trades: wins.len(),
        losing_trades: losses.len(),
        avg_win,
        avg_loss,
        avg_hold_time,
        expectancy: win_rate / 100.0 * avg_win + (100.0 - win_rate) / 100.0 * avg_loss,
        calmar_ratio,
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator != 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Simple returns between consecutive equity points.
fn step_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| ratio(w[1].equity - w[0].equity, w[0].equity))
        .collect()
}

/// Sharpe uses the sample standard deviation of all returns; Sortino the
/// population standard deviation of the negative returns.
fn risk_ratios(returns: &[f64], scale: f64) -> (f64, f64) {
    if returns.len() < 2 {
        return (0.0, 0.0);
    }
    let mean = returns.mean();
    let std_dev = returns.std_dev();
    let sharpe = if std_dev > 0.0 {
        mean / std_dev * scale
    } else {
        0.0
    };

    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_dev = if downside.is_empty() {
        0.0
    } else {
        (&downside[..]).population_std_dev()
    };
    let sortino = if downside_dev > 0.0 {
        mean / downside_dev * scale
    } else {
        0.0
    };

    (sharpe, sortino)
}

/// Absolute and percentage max drawdown from a running peak.
fn max_drawdown(equity_curve: &[EquityPoint]) -> (f64, f64) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0.0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_pct = 0.0_f64;
    for point in equity_curve {
        peak = peak.max(point.equity);
        let dd = peak - point.equity;
        max_dd = max_dd.max(dd);
        if peak > 0.0 {
            max_dd_pct = max_dd_pct.max(dd / peak * 100.0);
        }
    }
    (max_dd, max_dd_pct)
}

fn annualized_return(initial: f64, final_capital: f64, equity_curve: &[EquityPoint]) -> f64 {
    let growth = ratio(final_capital, initial);
    if growth <= 0.0 {
        return -100.0;
    }

    let span_ms = match (equity_curve.first(), equity_curve.last()) {
        (Some(first), Some(last)) => (last.timestamp - first.timestamp) as f64,
        _ => 0.0,
    };
    let duration_days = (span_ms / MS_PER_DAY).max(1.0);

    let annualized = (growth.powf(365.0 / duration_days) - 1.0) * 100.0;
    annualized.min(MAX_ANNUALIZED_RETURN_PCT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_core::types::PositionSide;

    const DAY: i64 = 86_400_000;

    fn trade(pnl: f64, hours: i64) -> ClosedTrade {
        ClosedTrade {
            entry_time: 0,
            exit_time: hours * 3_600_000,
            side: PositionSide::Long,
            entry_price: 100.0,
            exit_price: 100.0,
            amount: 1.0,
            pnl,
            pnl_percent: pnl / 100.0,
            fee: 0.0,
        }
    }

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                timestamp: i as i64 * DAY,
                equity,
            })
            .collect()
    }

    #[test]
    fn test_trade_partition_scenario() {
        let trades: Vec<ClosedTrade> = [500.0, -300.0, 200.0, 200.0, -100.0]
            .iter()
            .map(|&p| trade(p, 24))
            .collect();
        let m = calculate_metrics(&trades, 10_000.0, 10_500.0, &[], 365.0);

        assert_eq!(m.total_trades, 5);
        assert_eq!(m.winning_trades, 3);
        assert_eq!(m.losing_trades, 2);
        assert!((m.win_rate - 60.0).abs() < 1e-9);
        assert!((m.profit_factor - 2.25).abs() < 1e-9);
        assert!((m.avg_win - 300.0).abs() < 1e-9);
        assert!((m.avg_loss + 200.0).abs() < 1e-9);
        assert!((m.expectancy - 100.0).abs() < 1e-9);
        assert!((m.avg_hold_time - 24.0).abs() < 1e-9);
        assert!((m.total_return_pct - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_pnl_counts_as_loss() {
        let m = calculate_metrics(&[trade(0.0, 1)], 100.0, 100.0, &[], 365.0);
        assert_eq!(m.losing_trades, 1);
        assert_eq!(m.profit_factor, 0.0);
    }

    #[test]
    fn test_profit_factor_without_losses() {
        let m = calculate_metrics(&[trade(10.0, 1)], 100.0, 110.0, &[], 365.0);
        assert!(m.profit_factor.is_infinite());
    }

    #[test]
    fn test_drawdown_from_running_peak() {
        let m = calculate_metrics(&[], 100.0, 110.0, &curve(&[100.0, 120.0, 90.0, 110.0]), 365.0);
        assert!((m.max_drawdown - 30.0).abs() < 1e-9);
        assert!((m.max_drawdown_pct - 25.0).abs() < 1e-9);
        assert!((m.calmar_ratio - m.annualized_return / 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_sortino_uses_population_downside_deviation() {
        // Returns: +0.5, -0.5, +1.0, -0.75
        let equity = curve(&[100.0, 150.0, 75.0, 150.0, 37.5]);
        let m = calculate_metrics(&[], 100.0, 37.5, &equity, 365.0);

        // mean 0.0625, downside population deviation 0.125
        let expected = 0.5 * 365.0_f64.sqrt();
        assert!((m.sortino_ratio - expected).abs() < 1e-9);

        let rising = curve(&[100.0, 101.0, 103.0, 104.0]);
        let m = calculate_metrics(&[], 100.0, 104.0, &rising, 365.0);
        assert!(m.sharpe_ratio > 0.0);
        assert_eq!(m.sortino_ratio, 0.0);
    }

    #[test]
    fn test_sharpe_uses_sample_deviation() {
        let equity = curve(&[100.0, 102.0, 101.0, 104.0]);
        let returns = step_returns(&equity);
        let mean = returns.iter().sum::<f64>() / 3.0;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 2.0;
        let expected = mean / var.sqrt() * 365.0_f64.sqrt();

        let m = calculate_metrics(&[], 100.0, 104.0, &equity, 365.0);
        assert!((m.sharpe_ratio - expected).abs() < 1e-9);
    }

    #[test]
    fn test_annualized_return() {
        // One year doubling
        let equity = vec![
            EquityPoint {
                timestamp: 0,
                equity: 100.0,
            },
            EquityPoint {
                timestamp: 365 * DAY,
                equity: 200.0,
            },
        ];
        let m = calculate_metrics(&[], 100.0, 200.0, &equity, 365.0);
        assert!((m.annualized_return - 100.0).abs() < 1e-9);

        let wiped = calculate_metrics(&[], 100.0, 0.0, &equity, 365.0);
        assert_eq!(wiped.annualized_return, -100.0);
    }

    #[test]
    fn test_annualized_return_is_capped_for_short_spans() {
        // 10 000x in two days with a 50% dip along the way
        let equity = curve(&[100.0, 50.0, 1_000_000.0]);
        let m = calculate_metrics(&[], 100.0, 1_000_000.0, &equity, 365.0);

        assert_eq!(m.annualized_return, MAX_ANNUALIZED_RETURN_PCT);
        assert!(m.calmar_ratio.is_finite());
        assert!((m.calmar_ratio - MAX_ANNUALIZED_RETURN_PCT / 50.0).abs() < 1e-3);
        assert!(serde_json::to_string(&m).unwrap().contains("\"annualized_return\":1000000000"));
    }

    #[test]
    fn test_empty_run_is_zeroed() {
        let m = calculate_metrics(&[], 10_000.0, 10_000.0, &[], 8760.0);
        assert_eq!(m, MetricsSet::default());
    }
}

//! Monte Carlo resampling of a closed-trade list.
//!
//! Each simulation draws `trades.len()` trades with replacement and compounds
//! their percentage returns into one alternate equity path.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::info;

use crate::position::ClosedTrade;

/// Fewer trades than this produce an empty result.
const MIN_TRADES: usize = 5;
const HISTOGRAM_BUCKETS: usize = 20;

/// Resampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub simulations: usize,
    pub confidence_level: f64,
    /// RNG seed for reproducibility
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            simulations: 1000,
            confidence_level: 0.95,
            seed: 42,
        }
    }
}

/// One bar of the return histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub range_start: f64,
    pub range_end: f64,
    /// Share of simulations in this bucket
    pub frequency: f64,
}

/// Distribution of resampled outcomes. Returns and drawdowns are percentages.
///
/// `simulations == 0` marks a run skipped for lack of trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub simulations: usize,
    pub confidence_level: f64,
    pub median_return: f64,
    pub mean_return: f64,
    pub best_return: f64,
    pub worst_return: f64,
    /// Return at the `1 - confidence_level` tail
    pub var_return: f64,
    pub median_max_drawdown: f64,
    pub worst_max_drawdown: f64,
    pub median_sharpe: f64,
    /// Percent of simulations ending in profit, two decimals
    pub profit_probability: f64,
    pub histogram: Vec<HistogramBucket>,
}

struct PathOutcome {
    return_pct: f64,
    max_drawdown_pct: f64,
    sharpe: f64,
}

/// Bootstrap-resample `trades` `simulations` times using `rng`.
pub fn run_monte_carlo<R: Rng>(
    trades: &[ClosedTrade],
    initial_capital: f64,
    simulations: usize,
    confidence_level: f64,
    rng: &mut R,
) -> MonteCarloResult {
    if trades.len() < MIN_TRADES || simulations == 0 {
        return MonteCarloResult::default();
    }

    info!(trades = trades.len(), simulations, "Running Monte Carlo resampling");

    let mut returns = Vec::with_capacity(simulations);
    let mut drawdowns = Vec::with_capacity(simulations);
    let mut sharpes = Vec::with_capacity(simulations);
    let mut sample = Vec::with_capacity(trades.len());

    for _ in 0..simulations {
        sample.clear();
        sample.extend((0..trades.len()).map(|_| trades[rng.gen_range(0..trades.len())].pnl_percent));

        let outcome = simulate_path(&sample, initial_capital);
        returns.push(outcome.return_pct);
        drawdowns.push(outcome.max_drawdown_pct);
        sharpes.push(outcome.sharpe);
    }

    returns.sort_by(f64::total_cmp);
    drawdowns.sort_by(f64::total_cmp);
    sharpes.sort_by(f64::total_cmp);

    let confidence_level = confidence_level.clamp(0.0, 1.0);
    let var_index = (((1.0 - confidence_level) * simulations as f64).floor() as usize)
        .min(simulations - 1);
    let profitable = returns.iter().filter(|r| **r > 0.0).count();
    let profit_probability = (profitable as f64 / simulations as f64 * 100.0 * 100.0).round() / 100.0;

    let result = MonteCarloResult {
        simulations,
        confidence_level,
        median_return: returns[simulations / 2],
        mean_return: (&returns[..]).mean(),
        best_return: returns[simulations - 1],
        worst_return: returns[0],
        var_return: returns[var_index],
        median_max_drawdown: drawdowns[simulations / 2],
        worst_max_drawdown: drawdowns[simulations - 1],
        median_sharpe: sharpes[simulations / 2],
        profit_probability,
        histogram: histogram(&returns),
    };

    info!(
        median_return = result.median_return,
        var_return = result.var_return,
        profit_probability = result.profit_probability,
        "Monte Carlo complete"
    );
    result
}

/// [`run_monte_carlo`] with a `StdRng` seeded from `config.seed`.
pub fn run_monte_carlo_seeded(
    trades: &[ClosedTrade],
    initial_capital: f64,
    config: &MonteCarloConfig,
) -> MonteCarloResult {
    let mut rng = StdRng::seed_from_u64(config.seed);
    run_monte_carlo(
        trades,
        initial_capital,
        config.simulations,
        config.confidence_level,
        &mut rng,
    )
}

fn simulate_path(pnl_percents: &[f64], initial_capital: f64) -> PathOutcome {
    let mut capital = initial_capital;
    let mut peak = initial_capital;
    let mut max_drawdown_pct = 0.0_f64;

    for pct in pnl_percents {
        capital *= 1.0 + pct / 100.0;
        peak = peak.max(capital);
        if peak > 0.0 {
            max_drawdown_pct = max_drawdown_pct.max((peak - capital) / peak * 100.0);
        }
    }

    let return_pct = if initial_capital != 0.0 {
        (capital - initial_capital) / initial_capital * 100.0
    } else {
        0.0
    };

    let std_dev = pnl_percents.std_dev();
    let sharpe = if std_dev > 0.0 {
        pnl_percents.mean() / std_dev * (pnl_percents.len() as f64).sqrt()
    } else {
        0.0
    };

    PathOutcome {
        return_pct,
        max_drawdown_pct,
        sharpe,
    }
}

/// Equal-width buckets over `[min, max]` of the sorted returns.
fn histogram(sorted: &[f64]) -> Vec<HistogramBucket> {
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    let width = (max - min) / HISTOGRAM_BUCKETS as f64;
    let total = sorted.len() as f64;

    let mut counts = [0usize; HISTOGRAM_BUCKETS];
    for value in sorted {
        let bucket = if width > 0.0 {
            (((value - min) / width).floor() as usize).min(HISTOGRAM_BUCKETS - 1)
        } else {
            0
        };
        counts[bucket] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| HistogramBucket {
            range_start: min + width * i as f64,
            range_end: min + width * (i + 1) as f64,
            frequency: count as f64 / total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_core::types::PositionSide;

    fn trades(pnl_percents: &[f64]) -> Vec<ClosedTrade> {
        pnl_percents
            .iter()
            .enumerate()
            .map(|(i, &pct)| ClosedTrade {
                entry_time: i as i64 * 1000,
                exit_time: i as i64 * 1000 + 500,
                side: PositionSide::Long,
                entry_price: 100.0,
                exit_price: 100.0 * (1.0 + pct / 100.0),
                amount: 1.0,
                pnl: pct,
                pnl_percent: pct,
                fee: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_too_few_trades() {
        let result = run_monte_carlo_seeded(
            &trades(&[1.0, 2.0, -1.0, 3.0]),
            10_000.0,
            &MonteCarloConfig::default(),
        );
        assert_eq!(result.simulations, 0);
        assert_eq!(result, MonteCarloResult::default());
    }

    #[test]
    fn test_seed_reproducibility() {
        let list = trades(&[5.0, -3.0, 2.0, 2.0, -1.0, 4.0, -2.5]);
        let config = MonteCarloConfig {
            simulations: 500,
            ..Default::default()
        };

        let a = run_monte_carlo_seeded(&list, 10_000.0, &config);
        let b = run_monte_carlo_seeded(&list, 10_000.0, &config);
        assert_eq!(a, b);

        let other = run_monte_carlo_seeded(&list, 10_000.0, &MonteCarloConfig { seed: 7, ..config });
        assert_ne!(a.mean_return, other.mean_return);
    }

    #[test]
    fn test_ordering_and_histogram() {
        let list = trades(&[5.0, -3.0, 2.0, 2.0, -1.0, 4.0, -2.5]);
        let mut rng = StdRng::seed_from_u64(1);
        let r = run_monte_carlo(&list, 10_000.0, 1000, 0.95, &mut rng);

        assert_eq!(r.simulations, 1000);
        assert!(r.worst_return <= r.var_return);
        assert!(r.var_return <= r.median_return);
        assert!(r.median_return <= r.best_return);
        assert!(r.worst_max_drawdown >= r.median_max_drawdown);
        assert_eq!(r.histogram.len(), 20);

        let total: f64 = r.histogram.iter().map(|b| b.frequency).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((r.histogram[0].range_start - r.worst_return).abs() < 1e-9);
        assert!((r.histogram[19].range_end - r.best_return).abs() < 1e-6);
    }

    #[test]
    fn test_median_and_var_pick_sorted_indices() {
        let list = trades(&[5.0, -3.0, 2.0, 2.0, -1.0, 4.0, -2.5, 0.5]);
        let simulations = 200;
        let confidence = 0.95;

        let mut rng = StdRng::seed_from_u64(11);
        let r = run_monte_carlo(&list, 10_000.0, simulations, confidence, &mut rng);

        // Replay the same draws to rebuild the sorted return distribution
        let mut rng = StdRng::seed_from_u64(11);
        let mut returns: Vec<f64> = (0..simulations)
            .map(|_| {
                let sample: Vec<f64> = (0..list.len())
                    .map(|_| list[rng.gen_range(0..list.len())].pnl_percent)
                    .collect();
                simulate_path(&sample, 10_000.0).return_pct
            })
            .collect();
        returns.sort_by(f64::total_cmp);

        let var_index = ((1.0 - confidence) * simulations as f64).floor() as usize;
        assert_eq!(var_index, 10);
        assert_eq!(r.var_return, returns[var_index]);
        assert_eq!(r.median_return, returns[simulations / 2]);
        assert_eq!(r.worst_return, returns[0]);
        assert_eq!(r.best_return, returns[simulations - 1]);
    }

    #[test]
    fn test_identical_trades_converge() {
        let list = trades(&[1.0; 10]);
        let mut rng = StdRng::seed_from_u64(99);
        let r = run_monte_carlo(&list, 10_000.0, 10_000, 0.95, &mut rng);

        let expected = (1.01_f64.powi(10) - 1.0) * 100.0;
        assert!((r.median_return - expected).abs() < 1e-9);
        assert!((r.mean_return - expected).abs() < 1e-9);
        assert_eq!(r.profit_probability, 100.0);
        assert_eq!(r.median_max_drawdown, 0.0);
        assert_eq!(r.median_sharpe, 0.0);
        assert_eq!(r.histogram[0].frequency, 1.0);
    }
}

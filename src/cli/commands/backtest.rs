//! Backtest command implementation.

use anyhow::{Context, Result};
use bt_backtest::{run_backtest, run_monte_carlo_seeded, BacktestConfig, BacktestReport};
use bt_config::{parse_strategy_params, AppConfig};
use bt_core::types::{Candle, StrategyParams, Timeframe};
use bt_monitor::log_metrics;
use bt_strategies::StrategyRegistry;
use chrono::{Days, NaiveDate, NaiveTime};
use tracing::{info, warn};

use crate::cli::{BacktestArgs, OutputFormat};

pub async fn run(args: BacktestArgs, app_config: &AppConfig) -> Result<()> {
    info!("Starting backtest for strategy: {}", args.strategy);

    let registry = StrategyRegistry::new();
    let params = strategy_params(&registry, &args).await?;
    let factory = registry
        .factory(&args.strategy, &params)
        .context("Failed to create strategy")?;

    let config = build_config(&args, app_config, params);
    config.validate().context("Invalid backtest configuration")?;

    let timeframe: Timeframe = config
        .timeframe
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    if !args.data.exists() {
        anyhow::bail!(
            "Data file '{}' does not exist. Provide a CSV file with --data",
            args.data.display()
        );
    }
    let candles = bt_data::load_csv(&args.data, &args.symbol, timeframe)
        .await
        .with_context(|| format!("Failed to load {}", args.data.display()))?;
    let candles = filter_dates(candles, args.start, args.end);
    if candles.is_empty() {
        anyhow::bail!("No candles left after applying the date range");
    }
    info!(candles = candles.len(), "Loaded data for {}", args.symbol);

    let mut monte_carlo = app_config.monte_carlo.clone();
    let run_monte_carlo = args.monte_carlo.is_some();
    if let Some(simulations) = args.monte_carlo {
        monte_carlo.simulations = simulations;
    }
    if let Some(confidence) = args.confidence {
        monte_carlo.confidence_level = confidence;
    }
    if let Some(seed) = args.seed {
        monte_carlo.seed = seed;
    }

    let report = tokio::task::spawn_blocking(move || -> Result<BacktestReport> {
        let result = run_backtest(&candles, &config, &factory)?;
        let mut report = BacktestReport::new(result);
        if run_monte_carlo {
            let mc = run_monte_carlo_seeded(
                &report.result.trades,
                report.result.config.initial_capital,
                &monte_carlo,
            );
            if mc.simulations == 0 {
                warn!(
                    trades = report.result.trades.len(),
                    "Too few trades for Monte Carlo resampling"
                );
            }
            report = report.with_monte_carlo(mc);
        }
        Ok(report)
    })
    .await
    .context("Backtest task panicked")??;

    log_metrics("full", &report.result.metrics);
    if let Some(metrics) = &report.result.in_sample {
        log_metrics("in_sample", metrics);
    }
    if let Some(metrics) = &report.result.out_of_sample {
        log_metrics("out_of_sample", metrics);
    }

    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => println!("{}", report.summary()),
    }

    if let Some(save_path) = &args.save {
        tokio::fs::write(save_path, report.to_json()?)
            .await
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!("Results saved to {:?}", save_path);
    }
    if let Some(path) = &args.equity_csv {
        tokio::fs::write(path, report.equity_to_csv()?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Equity curve saved to {:?}", path);
    }
    if let Some(path) = &args.trades_csv {
        tokio::fs::write(path, report.trades_to_csv()?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Trades saved to {:?}", path);
    }

    Ok(())
}

/// Registry defaults, then the parameter file, then `-p` overrides.
async fn strategy_params(registry: &StrategyRegistry, args: &BacktestArgs) -> Result<StrategyParams> {
    let mut overrides = match &args.strategy_config {
        Some(path) => {
            let contents = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_strategy_params(&contents)
                .with_context(|| format!("Invalid strategy parameters in {}", path.display()))?
        }
        None => StrategyParams::new(),
    };
    for (key, value) in &args.params {
        overrides.insert(key.clone(), *value);
    }

    registry
        .resolve_params(&args.strategy, &overrides)
        .context("Failed to resolve strategy parameters")
}

fn build_config(args: &BacktestArgs, app_config: &AppConfig, params: StrategyParams) -> BacktestConfig {
    let mut config = app_config.backtest.to_config();

    config.symbol = args.symbol.clone();
    config.strategy = args.strategy.clone();
    config.strategy_params = params;
    config.start = args.start.map(|d| d.and_time(NaiveTime::MIN).and_utc());
    config.end = args.end.map(|d| d.and_time(NaiveTime::MIN).and_utc());

    if let Some(timeframe) = &args.timeframe {
        config.timeframe = timeframe.clone();
    }
    if let Some(capital) = args.capital {
        config.initial_capital = capital;
    }
    if let Some(fee) = args.fee_pct {
        config.fee_pct = fee;
    }
    if let Some(slippage) = args.slippage_pct {
        config.slippage_pct = slippage;
    }
    if let Some(mode) = args.mode {
        config.position_mode = mode;
    }
    if args.max_entries.is_some() {
        config.max_entries = args.max_entries;
    }
    if args.allocation_pct.is_some() {
        config.allocation_pct = args.allocation_pct;
    }
    if let Some(split) = args.split {
        config.walk_forward_split = split;
    }
    config.allow_short |= args.allow_short;
    config.dynamic_slippage |= args.dynamic_slippage;

    config
}

/// Keep candles from the start of `start` through the end of `end`.
fn filter_dates(candles: Vec<Candle>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Vec<Candle> {
    let day_start = |d: NaiveDate| d.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    let from = start.map(day_start).unwrap_or(i64::MIN);
    let until = end
        .and_then(|d| d.checked_add_days(Days::new(1)))
        .map(day_start)
        .unwrap_or(i64::MAX);

    candles
        .into_iter()
        .filter(|c| c.timestamp >= from && c.timestamp < until)
        .collect()
}

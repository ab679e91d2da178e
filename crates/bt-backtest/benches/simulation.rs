//! Benchmarks for the simulation loop.

use bt_backtest::{run_backtest, BacktestConfig, BacktestEngine, PositionMode};
use bt_core::types::{Candle, StrategyParams};
use bt_strategies::StrategyRegistry;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_test_data(size: usize) -> Vec<Candle> {
    (0..size)
        .map(|i| {
            let price = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Candle::new(
                i as i64 * 3_600_000,
                price,
                price + 1.0,
                price - 1.0,
                price + 0.5,
                1_000.0 + (i % 50) as f64 * 20.0,
            )
        })
        .collect()
}

fn benchmark_engine(c: &mut Criterion) {
    let registry = StrategyRegistry::new();
    let mut group = c.benchmark_group("simulation");

    for name in ["ma_crossover", "rsi", "mean_reversion"] {
        let params = registry
            .resolve_params(name, &StrategyParams::new())
            .expect("built-in strategy");
        let make = registry.factory(name, &params).expect("valid defaults");
        let config = BacktestConfig {
            strategy: name.to_string(),
            strategy_params: params,
            dynamic_slippage: true,
            position_mode: PositionMode::Accumulate,
            ..Default::default()
        };
        let engine = BacktestEngine::new(&config);

        for size in [1_000, 10_000] {
            let data = generate_test_data(size);
            group.bench_with_input(BenchmarkId::new(name, size), &data, |b, data| {
                b.iter(|| {
                    let mut strategy = make();
                    engine.run(black_box(data), strategy.as_mut())
                })
            });
        }
    }

    group.finish();
}

fn benchmark_walk_forward(c: &mut Criterion) {
    let registry = StrategyRegistry::new();
    let params = registry
        .resolve_params("ma_crossover", &StrategyParams::new())
        .expect("built-in strategy");
    let make = registry.factory("ma_crossover", &params).expect("valid defaults");
    let config = BacktestConfig {
        strategy_params: params,
        ..Default::default()
    };
    let data = generate_test_data(10_000);

    c.bench_function("walk_forward/ma_crossover/10000", |b| {
        b.iter(|| run_backtest(black_box(&data), &config, &make))
    });
}

criterion_group!(benches, benchmark_engine, benchmark_walk_forward);
criterion_main!(benches);

//! Logging setup.

use bt_backtest::MetricsSet;
use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Setup logging with the given level.
///
/// When `file` is given, a JSON copy of every event is also written to a
/// daily-rolling file named after it. Keep the returned guard alive for the
/// life of the program or buffered lines are lost.
pub fn setup_logging(level: &str, json: bool, file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = if json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().pretty().boxed()
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let (directory, prefix) = split_log_path(path);
            let appender = tracing_appender::rolling::daily(directory, prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    guard
}

fn split_log_path(path: &Path) -> (&Path, &str) {
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("backtester");
    (directory, prefix)
}

/// Emit a metrics set as one structured event.
pub fn log_metrics(label: &str, metrics: &MetricsSet) {
    info!(
        label,
        total_return_pct = metrics.total_return_pct,
        annualized_return = metrics.annualized_return,
        max_drawdown_pct = metrics.max_drawdown_pct,
        sharpe = metrics.sharpe_ratio,
        sortino = metrics.sortino_ratio,
        calmar = metrics.calmar_ratio,
        win_rate = metrics.win_rate,
        profit_factor = metrics.profit_factor,
        trades = metrics.total_trades,
        expectancy = metrics.expectancy,
        "Backtest metrics"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path() {
        let (dir, prefix) = split_log_path(Path::new("logs/backtester"));
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(prefix, "backtester");

        let (dir, prefix) = split_log_path(Path::new("run.log"));
        assert_eq!(dir, Path::new("."));
        assert_eq!(prefix, "run.log");
    }

    #[test]
    fn test_log_metrics_without_subscriber() {
        let metrics = MetricsSet {
            profit_factor: f64::INFINITY,
            ..Default::default()
        };
        log_metrics("full", &metrics);
    }
}

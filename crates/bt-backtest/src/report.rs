//! Backtest report generation.

use serde::{Deserialize, Serialize};
use std::io;

use crate::{BacktestResult, MetricsSet, MonteCarloResult};

/// Complete backtest report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub result: BacktestResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monte_carlo: Option<MonteCarloResult>,
}

const RULE: &str = "═══════════════════════════════════════════════════════════\n";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────\n";

impl BacktestReport {
    pub fn new(result: BacktestResult) -> Self {
        Self {
            result,
            monte_carlo: None,
        }
    }

    pub fn with_monte_carlo(mut self, monte_carlo: MonteCarloResult) -> Self {
        self.monte_carlo = Some(monte_carlo);
        self
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let config = &self.result.config;
        let m = &self.result.metrics;
        let mut s = String::new();

        s.push_str(RULE);
        s.push_str("                     BACKTEST REPORT                        \n");
        s.push_str(RULE);
        s.push_str(&format!(
            "  {} {} | {} | {} mode{}\n\n",
            config.symbol,
            config.timeframe,
            config.strategy,
            config.position_mode,
            if config.allow_short { ", shorts on" } else { "" }
        ));

        s.push_str("PERFORMANCE\n");
        s.push_str(THIN_RULE);
        s.push_str(&format!(
            "  Initial Capital:     ${:.2}\n",
            config.initial_capital
        ));
        s.push_str(&format!(
            "  Final Capital:       ${:.2}\n",
            self.result.final_capital
        ));
        s.push_str(&format!("  Total Return:        {:.2}%\n", m.total_return_pct));
        s.push_str(&format!("  Annualized Return:   {:.2}%\n", m.annualized_return));
        s.push_str(&format!(
            "  Max Drawdown:        {:.2}% (${:.2})\n",
            m.max_drawdown_pct, m.max_drawdown
        ));
        s.push('\n');

        s.push_str("RISK METRICS\n");
        s.push_str(THIN_RULE);
        s.push_str(&format!("  Sharpe Ratio:        {:.2}\n", m.sharpe_ratio));
        s.push_str(&format!("  Sortino Ratio:       {:.2}\n", m.sortino_ratio));
        s.push_str(&format!("  Calmar Ratio:        {:.2}\n", m.calmar_ratio));
        s.push_str(&format!("  Profit Factor:       {:.2}\n", m.profit_factor));
        s.push('\n');

        s.push_str("TRADE STATISTICS\n");
        s.push_str(THIN_RULE);
        s.push_str(&format!("  Total Trades:        {}\n", m.total_trades));
        s.push_str(&format!("  Winning Trades:      {}\n", m.winning_trades));
        s.push_str(&format!("  Losing Trades:       {}\n", m.losing_trades));
        s.push_str(&format!("  Win Rate:            {:.2}%\n", m.win_rate));
        s.push_str(&format!("  Avg Win:             ${:.2}\n", m.avg_win));
        s.push_str(&format!("  Avg Loss:            ${:.2}\n", m.avg_loss));
        s.push_str(&format!("  Expectancy:          ${:.2}\n", m.expectancy));
        s.push_str(&format!("  Avg Hold Time:       {:.1}h\n", m.avg_hold_time));
        s.push('\n');

        s.push_str("WALK-FORWARD\n");
        s.push_str(THIN_RULE);
        match (&self.result.in_sample, &self.result.out_of_sample) {
            (Some(is), Some(oos)) => {
                s.push_str(&split_line("In-Sample", is));
                s.push_str(&split_line("Out-of-Sample", oos));
            }
            _ => s.push_str("  Not enough data for a split\n"),
        }
        s.push('\n');

        if let Some(mc) = &self.monte_carlo {
            s.push_str(&monte_carlo_section(mc));
        }

        s.push_str(RULE);
        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the equity and drawdown curves as CSV.
    pub fn write_equity_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["timestamp", "equity", "drawdown_pct"])?;
        for (point, dd) in self
            .result
            .equity_curve
            .iter()
            .zip(&self.result.drawdown_curve)
        {
            wtr.write_record([
                point.timestamp.to_string(),
                point.equity.to_string(),
                dd.drawdown_pct.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Equity curve as a CSV string.
    pub fn equity_to_csv(&self) -> Result<String, csv::Error> {
        let mut buf = Vec::new();
        self.write_equity_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the closed trades as CSV, one row per trade.
    pub fn write_trades_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for trade in &self.result.trades {
            wtr.serialize(trade)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn trades_to_csv(&self) -> Result<String, csv::Error> {
        let mut buf = Vec::new();
        self.write_trades_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn split_line(label: &str, m: &MetricsSet) -> String {
    format!(
        "  {:<14} return {:>8.2}%  sharpe {:>6.2}  trades {:>4}  win {:>6.2}%\n",
        label, m.total_return_pct, m.sharpe_ratio, m.total_trades, m.win_rate
    )
}

fn monte_carlo_section(mc: &MonteCarloResult) -> String {
    let mut s = String::new();
    s.push_str("MONTE CARLO\n");
    s.push_str(THIN_RULE);
    if mc.simulations == 0 {
        s.push_str("  Skipped: fewer than 5 trades\n\n");
        return s;
    }
    s.push_str(&format!("  Simulations:         {}\n", mc.simulations));
    s.push_str(&format!(
        "  Median Return:       {:.2}% (mean {:.2}%)\n",
        mc.median_return, mc.mean_return
    ));
    s.push_str(&format!(
        "  Return Range:        {:.2}% .. {:.2}%\n",
        mc.worst_return, mc.best_return
    ));
    s.push_str(&format!(
        "  VaR ({:.0}%):           {:.2}%\n",
        mc.confidence_level * 100.0,
        mc.var_return
    ));
    s.push_str(&format!(
        "  Max Drawdown:        {:.2}% median, {:.2}% worst\n",
        mc.median_max_drawdown, mc.worst_max_drawdown
    ));
    s.push_str(&format!("  Median Sharpe:       {:.2}\n", mc.median_sharpe));
    s.push_str(&format!(
        "  Profit Probability:  {:.2}%\n",
        mc.profit_probability
    ));
    s.push('\n');
    s
}

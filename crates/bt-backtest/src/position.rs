//! Position ledger.
//!
//! Holds the simulated cash balance and at most one open position, and turns
//! full closes into [`ClosedTrade`] records.

use bt_core::types::{PositionContext, PositionSide};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One fill contributing to a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionEntry {
    pub price: f64,
    pub amount: f64,
    pub timestamp: i64,
}

/// Cash and size of a prospective entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryFill {
    /// Capital taken from the balance
    pub allocated: f64,
    pub fee: f64,
    pub price: f64,
    pub amount: f64,
}

impl EntryFill {
    /// Size an entry spending `allocation_pct` percent of `capital` at `price`.
    ///
    /// Returns `None` when there is nothing to deploy.
    pub fn size(capital: f64, allocation_pct: f64, price: f64, fee_rate: f64) -> Option<Self> {
        let allocated = capital * allocation_pct / 100.0;
        if allocated.is_nan() || allocated <= 0.0 || price.is_nan() || price <= 0.0 {
            return None;
        }
        let fee = allocated * fee_rate;
        Some(Self {
            allocated,
            fee,
            price,
            amount: (allocated - fee) / price,
        })
    }
}

/// The single open position of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePosition {
    pub side: PositionSide,
    pub entries: Vec<PositionEntry>,
    pub total_amount: f64,
    /// Sum of entry notional (`price * amount`)
    pub total_cost: f64,
    /// Sum of capital allocated to the entries, fees included
    pub capital_committed: f64,
    pub entry_fees: f64,
    pub first_entry_time: i64,
    pub first_entry_index: usize,
}

impl ActivePosition {
    fn open(side: PositionSide, fill: EntryFill, timestamp: i64, index: usize) -> Self {
        let mut position = Self {
            side,
            entries: Vec::new(),
            total_amount: 0.0,
            total_cost: 0.0,
            capital_committed: 0.0,
            entry_fees: 0.0,
            first_entry_time: timestamp,
            first_entry_index: index,
        };
        position.add_entry(fill, timestamp);
        position
    }

    fn add_entry(&mut self, fill: EntryFill, timestamp: i64) {
        self.entries.push(PositionEntry {
            price: fill.price,
            amount: fill.amount,
            timestamp,
        });
        self.total_amount += fill.amount;
        self.total_cost += fill.price * fill.amount;
        self.capital_committed += fill.allocated;
        self.entry_fees += fill.fee;
    }

    /// Volume-weighted entry price.
    pub fn avg_entry_price(&self) -> f64 {
        if self.total_amount > 0.0 {
            self.total_cost / self.total_amount
        } else {
            0.0
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Liquidation value at `price`, net of a hypothetical exit fee.
    pub fn market_value(&self, price: f64, fee_rate: f64) -> f64 {
        let exit_notional = self.total_amount * price;
        match self.side {
            PositionSide::Long => exit_notional * (1.0 - fee_rate),
            PositionSide::Short => {
                self.total_cost + (self.avg_entry_price() - price) * self.total_amount
                    - exit_notional * fee_rate
            }
        }
    }

    /// Price move against the average entry, in percent, signed by side.
    pub fn unrealized_pnl_pct(&self, price: f64) -> f64 {
        let avg = self.avg_entry_price();
        if avg <= 0.0 {
            return 0.0;
        }
        match self.side {
            PositionSide::Long => (price - avg) / avg * 100.0,
            PositionSide::Short => (avg - price) / avg * 100.0,
        }
    }

    /// Read-only view handed to strategies.
    pub fn context(&self, index: usize, price: f64) -> PositionContext {
        PositionContext {
            has_position: true,
            side: Some(self.side),
            avg_entry_price: self.avg_entry_price(),
            entry_count: self.entry_count(),
            candles_held: index.saturating_sub(self.first_entry_index),
            unrealized_pnl_pct: self.unrealized_pnl_pct(price),
        }
    }
}

/// Record of a fully closed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub entry_time: i64,
    pub exit_time: i64,
    pub side: PositionSide,
    /// Weighted average entry price
    pub entry_price: f64,
    pub exit_price: f64,
    pub amount: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
    /// Entry plus exit fees
    pub fee: f64,
}

impl ClosedTrade {
    /// Holding time in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.exit_time - self.entry_time
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}

/// Cash balance, open position and closed-trade history for one run.
#[derive(Debug, Clone)]
pub struct Ledger {
    capital: f64,
    fee_rate: f64,
    position: Option<ActivePosition>,
    trades: Vec<ClosedTrade>,
}

impl Ledger {
    pub fn new(initial_capital: f64, fee_rate: f64) -> Self {
        Self {
            capital: initial_capital,
            fee_rate,
            position: None,
            trades: Vec::new(),
        }
    }

    /// Free cash, excluding capital committed to the open position.
    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn position(&self) -> Option<&ActivePosition> {
        self.position.as_ref()
    }

    pub fn side(&self) -> Option<PositionSide> {
        self.position.as_ref().map(|p| p.side)
    }

    /// Open a new position or add an entry to the open one on the same side.
    ///
    /// Returns `false` without touching state when the allocation is empty or
    /// the open position is on the other side.
    pub fn enter(
        &mut self,
        side: PositionSide,
        allocation_pct: f64,
        fill_price: f64,
        timestamp: i64,
        index: usize,
    ) -> bool {
        let Some(fill) = EntryFill::size(self.capital, allocation_pct, fill_price, self.fee_rate)
        else {
            return false;
        };

        match &mut self.position {
            Some(position) if position.side != side => return false,
            Some(position) => position.add_entry(fill, timestamp),
            None => self.position = Some(ActivePosition::open(side, fill, timestamp, index)),
        }
        self.capital -= fill.allocated;

        debug!(
            %side,
            price = fill.price,
            amount = fill.amount,
            allocated = fill.allocated,
            "Entry filled"
        );
        true
    }

    /// Close the open position in full at `fill_price`.
    pub fn close(&mut self, fill_price: f64, timestamp: i64) -> Option<&ClosedTrade> {
        let position = self.position.take()?;
        let exit_notional = position.total_amount * fill_price;
        let exit_fee = exit_notional * self.fee_rate;

        let (pnl, pnl_percent) = match position.side {
            PositionSide::Long => {
                let proceeds = exit_notional - exit_fee;
                let pnl = proceeds - position.capital_committed;
                (pnl, ratio_pct(pnl, position.capital_committed))
            }
            PositionSide::Short => {
                let entry_proceeds = position.total_cost;
                let pnl = entry_proceeds - exit_notional - (position.entry_fees + exit_fee);
                (pnl, ratio_pct(pnl, entry_proceeds))
            }
        };

        self.capital += position.capital_committed + pnl;

        let trade = ClosedTrade {
            entry_time: position.first_entry_time,
            exit_time: timestamp,
            side: position.side,
            entry_price: position.avg_entry_price(),
            exit_price: fill_price,
            amount: position.total_amount,
            pnl,
            pnl_percent,
            fee: position.entry_fees + exit_fee,
        };
        debug!(
            side = %trade.side,
            entry = trade.entry_price,
            exit = trade.exit_price,
            pnl = trade.pnl,
            "Position closed"
        );
        self.trades.push(trade);
        self.trades.last()
    }

    /// Cash plus the liquidation value of the open position.
    pub fn equity(&self, price: f64) -> f64 {
        self.capital
            + self
                .position
                .as_ref()
                .map_or(0.0, |p| p.market_value(price, self.fee_rate))
    }

    pub fn context(&self, index: usize, price: f64) -> PositionContext {
        self.position
            .as_ref()
            .map_or_else(PositionContext::flat, |p| p.context(index, price))
    }

    /// Consume the ledger, yielding the final cash balance and the trades.
    pub fn into_parts(self) -> (f64, Vec<ClosedTrade>) {
        (self.capital, self.trades)
    }
}

fn ratio_pct(value: f64, base: f64) -> f64 {
    if base != 0.0 {
        value / base * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEE: f64 = 0.001;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn test_entry_sizing() {
        let fill = EntryFill::size(10_000.0, 20.0, 50.0, FEE).unwrap();
        assert!(approx(fill.allocated, 2_000.0));
        assert!(approx(fill.fee, 2.0));
        assert!(approx(fill.amount, 1_998.0 / 50.0));

        assert!(EntryFill::size(0.0, 20.0, 50.0, FEE).is_none());
        assert!(EntryFill::size(10_000.0, 20.0, 0.0, FEE).is_none());
    }

    #[test]
    fn test_weighted_average_entry() {
        let mut ledger = Ledger::new(10_000.0, FEE);
        assert!(ledger.enter(PositionSide::Long, 20.0, 100.0, 1, 0));
        assert!(ledger.enter(PositionSide::Long, 20.0, 80.0, 2, 1));

        let position = ledger.position().unwrap();
        assert_eq!(position.entry_count(), 2);
        assert!(approx(
            position.avg_entry_price() * position.total_amount,
            position.total_cost
        ));
        assert!(position.avg_entry_price() < 100.0 && position.avg_entry_price() > 80.0);
        assert_eq!(position.first_entry_time, 1);
    }

    #[test]
    fn test_long_round_trip_conserves_capital() {
        let mut ledger = Ledger::new(10_000.0, FEE);
        let before = ledger.capital();
        ledger.enter(PositionSide::Long, 100.0, 100.0, 0, 0);
        let committed = ledger.position().unwrap().capital_committed;

        let trade = ledger.close(110.0, 10).unwrap().clone();
        let proceeds = trade.amount * 110.0 * (1.0 - FEE);

        assert!(approx(ledger.capital(), before - committed + proceeds));
        assert!(approx(ledger.capital(), before + trade.pnl));
        assert!(trade.pnl > 0.0);
        assert!(approx(trade.pnl_percent, trade.pnl / committed * 100.0));
    }

    #[test]
    fn test_flat_round_trip_costs_only_fees() {
        for side in [PositionSide::Long, PositionSide::Short] {
            let mut ledger = Ledger::new(10_000.0, FEE);
            ledger.enter(side, 100.0, 100.0, 0, 0);
            let trade = ledger.close(100.0, 1).unwrap().clone();

            assert!(trade.pnl < 0.0, "{side} should lose the fees");
            assert!(approx(-trade.pnl, trade.fee));
            assert!(approx(ledger.capital(), 10_000.0 - trade.fee));
        }
    }

    #[test]
    fn test_short_profits_when_price_falls() {
        let mut ledger = Ledger::new(10_000.0, FEE);
        ledger.enter(PositionSide::Short, 50.0, 100.0, 0, 0);
        let position = ledger.position().unwrap().clone();

        let trade = ledger.close(90.0, 5).unwrap().clone();
        let expected = position.total_cost
            - position.total_amount * 90.0
            - (position.entry_fees + position.total_amount * 90.0 * FEE);

        assert!(approx(trade.pnl, expected));
        assert!(approx(trade.pnl_percent, expected / position.total_cost * 100.0));
        assert!(approx(ledger.capital(), 10_000.0 + trade.pnl));
    }

    #[test]
    fn test_equity_matches_close_value() {
        for side in [PositionSide::Long, PositionSide::Short] {
            let mut ledger = Ledger::new(10_000.0, FEE);
            ledger.enter(side, 60.0, 100.0, 0, 0);
            ledger.enter(side, 60.0, 104.0, 1, 1);

            let marked = ledger.equity(97.0);
            ledger.close(97.0, 2);
            assert!(approx(marked, ledger.capital()), "{side}: {marked} vs {}", ledger.capital());
        }
    }

    #[test]
    fn test_opposite_side_entry_rejected() {
        let mut ledger = Ledger::new(10_000.0, FEE);
        ledger.enter(PositionSide::Long, 50.0, 100.0, 0, 0);

        assert!(!ledger.enter(PositionSide::Short, 50.0, 100.0, 1, 1));
        assert_eq!(ledger.side(), Some(PositionSide::Long));
        assert_eq!(ledger.position().unwrap().entry_count(), 1);
    }

    #[test]
    fn test_context() {
        let mut ledger = Ledger::new(10_000.0, FEE);
        assert!(!ledger.context(5, 100.0).has_position);

        ledger.enter(PositionSide::Short, 50.0, 100.0, 0, 5);
        let ctx = ledger.context(9, 95.0);
        assert!(ctx.is_short());
        assert_eq!(ctx.candles_held, 4);
        assert_eq!(ctx.entry_count, 1);
        assert!(approx(ctx.unrealized_pnl_pct, 5.0));
    }
}

//! Position side and the read-only position view given to strategies.

use serde::{Deserialize, Serialize};

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// Snapshot of the simulated position, as seen by a strategy.
///
/// Strategies never receive the ledger itself, only these primitives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionContext {
    pub has_position: bool,
    pub side: Option<PositionSide>,
    pub avg_entry_price: f64,
    pub entry_count: usize,
    /// Candles elapsed since the first entry was filled
    pub candles_held: usize,
    /// Unrealized P&L at the current close, in percent of the average entry
    pub unrealized_pnl_pct: f64,
}

impl PositionContext {
    /// Context for a flat book.
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn is_long(&self) -> bool {
        self.side == Some(PositionSide::Long)
    }

    pub fn is_short(&self) -> bool {
        self.side == Some(PositionSide::Short)
    }
}

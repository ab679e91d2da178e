//! Trading signals emitted by strategies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a signal asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Buy,
    Sell,
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalAction::Buy => write!(f, "BUY"),
            SignalAction::Sell => write!(f, "SELL"),
        }
    }
}

/// Free-form context attached to a signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalMetadata {
    /// Indicator values at signal time
    pub indicators: BTreeMap<String, f64>,
    /// Human-readable reason
    pub reason: String,
}

/// A trading signal.
///
/// The simulation engine only acts on `action`. Confidence, price levels and
/// metadata are carried for downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub action: SignalAction,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Reference price when the signal was produced
    pub price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    #[serde(default)]
    pub metadata: SignalMetadata,
}

impl Signal {
    pub fn buy(price: f64) -> Self {
        Self::new(SignalAction::Buy, price)
    }

    pub fn sell(price: f64) -> Self {
        Self::new(SignalAction::Sell, price)
    }

    fn new(action: SignalAction, price: f64) -> Self {
        Self {
            action,
            confidence: 1.0,
            price,
            stop_loss: None,
            take_profit: None,
            metadata: SignalMetadata::default(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_levels(mut self, stop_loss: Option<f64>, take_profit: Option<f64>) -> Self {
        self.stop_loss = stop_loss;
        self.take_profit = take_profit;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.metadata.reason = reason.into();
        self
    }

    pub fn with_indicator(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metadata.indicators.insert(name.into(), value);
        self
    }

    pub fn is_buy(&self) -> bool {
        self.action == SignalAction::Buy
    }
}

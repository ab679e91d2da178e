//! Strategy parameter map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Numeric strategy configuration, keyed by parameter name.
///
/// Ordered so that serialized configs are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyParams(BTreeMap<String, f64>);

impl StrategyParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Value for `key`, or `default` when absent or not finite.
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            Some(v) if v.is_finite() => v,
            _ => default,
        }
    }

    /// Integer-valued parameter (periods, counts). Rounds and clamps at zero.
    pub fn period_or(&self, key: &str, default: usize) -> usize {
        match self.get(key) {
            Some(v) if v.is_finite() && v >= 0.0 => v.round() as usize,
            _ => default,
        }
    }

    /// Boolean flag encoded as a number (non-zero is true).
    pub fn flag_or(&self, key: &str, default: bool) -> bool {
        self.get(key).map(|v| v != 0.0).unwrap_or(default)
    }

    /// Overlay `other` on top of `self`.
    pub fn merged(&self, other: &StrategyParams) -> StrategyParams {
        let mut out = self.clone();
        for (k, v) in &other.0 {
            out.0.insert(k.clone(), *v);
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for StrategyParams {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

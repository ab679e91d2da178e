//! Strategy registry for looking up built-in strategies by key.

use crate::{
    MACrossoverConfig, MACrossoverStrategy, MeanReversionConfig, MeanReversionStrategy, RsiConfig,
    RsiStrategy,
};
use bt_core::{
    error::StrategyError,
    traits::{factory, StrategyFactory},
    types::StrategyParams,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Registry key, e.g. `ma_crossover`
    pub key: String,
    /// Display name
    pub name: String,
    pub description: String,
    /// Parameters used when the caller supplies none
    pub default_params: StrategyParams,
}

/// Registry for available trading strategies.
pub struct StrategyRegistry {
    strategies: BTreeMap<String, StrategyInfo>,
}

impl StrategyRegistry {
    /// Create a new strategy registry with all built-in strategies.
    pub fn new() -> Self {
        let entries = [
            (
                "ma_crossover",
                "MA Crossover",
                "Generates signals based on fast/slow moving average crossovers",
                MACrossoverConfig::default().to_params(),
            ),
            (
                "mean_reversion",
                "Mean Reversion",
                "Trades reversions to the mean using Bollinger Bands",
                MeanReversionConfig::default().to_params(),
            ),
            (
                "rsi",
                "RSI Strategy",
                "Trades RSI overbought/oversold reversals",
                RsiConfig::default().to_params(),
            ),
        ];

        let strategies = entries
            .into_iter()
            .map(|(key, name, description, default_params)| {
                (
                    key.to_string(),
                    StrategyInfo {
                        key: key.to_string(),
                        name: name.to_string(),
                        description: description.to_string(),
                        default_params,
                    },
                )
            })
            .collect();

        Self { strategies }
    }

    /// List all available strategies, ordered by key.
    pub fn list(&self) -> Vec<&StrategyInfo> {
        self.strategies.values().collect()
    }

    pub fn get(&self, name: &str) -> Option<&StrategyInfo> {
        self.strategies.get(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    pub fn names(&self) -> Vec<&String> {
        self.strategies.keys().collect()
    }

    /// Defaults for `name` overlaid with `overrides`.
    pub fn resolve_params(
        &self,
        name: &str,
        overrides: &StrategyParams,
    ) -> Result<StrategyParams, StrategyError> {
        let info = self
            .get(name)
            .ok_or_else(|| StrategyError::NotFound(name.to_string()))?;
        Ok(info.default_params.merged(overrides))
    }

    /// Validate `params` for `name` and return a factory producing fresh
    /// instances of that strategy.
    pub fn factory(
        &self,
        name: &str,
        params: &StrategyParams,
    ) -> Result<StrategyFactory, StrategyError> {
        let made = match name {
            "ma_crossover" => {
                MACrossoverConfig::from_params(params).validate()?;
                factory(MACrossoverStrategy::new)
            }
            "mean_reversion" => {
                MeanReversionConfig::from_params(params).validate()?;
                factory(MeanReversionStrategy::new)
            }
            "rsi" => {
                RsiConfig::from_params(params).validate()?;
                factory(RsiStrategy::new)
            }
            _ => return Err(StrategyError::NotFound(name.to_string())),
        };
        debug!(strategy = name, "Strategy factory created");
        Ok(made)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_list() {
        let registry = StrategyRegistry::new();
        let keys: Vec<&str> = registry.list().iter().map(|s| s.key.as_str()).collect();

        assert_eq!(keys, vec!["ma_crossover", "mean_reversion", "rsi"]);
    }

    #[test]
    fn test_registry_get() {
        let registry = StrategyRegistry::new();

        assert!(registry.get("ma_crossover").is_some());
        assert!(registry.get("unknown").is_none());
        assert_eq!(
            registry.get("rsi").unwrap().default_params.get("period"),
            Some(14.0)
        );
    }

    #[test]
    fn test_factory_produces_fresh_instances() {
        let registry = StrategyRegistry::new();
        let params = registry
            .resolve_params("ma_crossover", &StrategyParams::new())
            .unwrap();

        let make = registry.factory("ma_crossover", &params).unwrap();
        let a = make();
        let b = make();
        assert_eq!(a.name(), "MA Crossover");
        assert_eq!(b.name(), "MA Crossover");
    }

    #[test]
    fn test_factory_rejects_invalid_params() {
        let registry = StrategyRegistry::new();
        let params = StrategyParams::new()
            .with("fast_period", 50.0)
            .with("slow_period", 10.0);

        assert!(matches!(
            registry.factory("ma_crossover", &params),
            Err(StrategyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unknown_strategy() {
        let registry = StrategyRegistry::new();

        assert!(matches!(
            registry.factory("unknown", &StrategyParams::new()),
            Err(StrategyError::NotFound(_))
        ));
        assert!(registry.resolve_params("unknown", &StrategyParams::new()).is_err());
    }
}

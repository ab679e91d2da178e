//! Strategy trait definitions.

use crate::types::{Candle, PositionContext, Signal, StrategyParams};
use std::sync::Arc;

/// Core strategy trait.
///
/// A strategy maps a trailing window of candles plus its numeric parameters
/// and a read-only view of the simulated position to an optional signal.
/// Strategies may keep internal memory between calls, which is why the
/// engine always asks a [`StrategyFactory`] for a fresh instance per run.
pub trait Strategy: Send {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// Evaluate the window and optionally emit a signal.
    ///
    /// # Arguments
    /// * `window` - Trailing candles, oldest first; the last one is the current candle
    /// * `params` - Static strategy configuration
    /// * `position` - Position state at the current candle's close
    fn analyze(
        &mut self,
        window: &[Candle],
        params: &StrategyParams,
        position: &PositionContext,
    ) -> Option<Signal>;

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}

/// Zero-argument constructor producing isolated strategy instances.
pub type StrategyFactory = Arc<dyn Fn() -> Box<dyn Strategy> + Send + Sync>;

/// Wrap a constructor closure as a [`StrategyFactory`].
pub fn factory<F, S>(make: F) -> StrategyFactory
where
    F: Fn() -> S + Send + Sync + 'static,
    S: Strategy + 'static,
{
    Arc::new(move || Box::new(make()) as Box<dyn Strategy>)
}

/// Strategy backed by a closure.
pub struct FnStrategy<F> {
    name: String,
    f: F,
}

impl<F> FnStrategy<F>
where
    F: FnMut(&[Candle], &StrategyParams, &PositionContext) -> Option<Signal> + Send,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Strategy for FnStrategy<F>
where
    F: FnMut(&[Candle], &StrategyParams, &PositionContext) -> Option<Signal> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn analyze(
        &mut self,
        window: &[Candle],
        params: &StrategyParams,
        position: &PositionContext,
    ) -> Option<Signal> {
        (self.f)(window, params, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingStrategy {
        calls: usize,
    }

    impl Strategy for CountingStrategy {
        fn name(&self) -> &str {
            "counting"
        }

        fn analyze(
            &mut self,
            window: &[Candle],
            _params: &StrategyParams,
            _position: &PositionContext,
        ) -> Option<Signal> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                window.last().map(|c| Signal::buy(c.close))
            } else {
                None
            }
        }
    }

    #[test]
    fn test_factory_builds_isolated_instances() {
        let make = factory(|| CountingStrategy { calls: 0 });
        let window = [Candle::new(0, 1.0, 1.0, 1.0, 1.0, 1.0)];
        let params = StrategyParams::new();
        let ctx = PositionContext::flat();

        let mut first = make();
        assert!(first.analyze(&window, &params, &ctx).is_none());
        assert!(first.analyze(&window, &params, &ctx).is_some());

        // A second instance starts from a clean state
        let mut second = make();
        assert!(second.analyze(&window, &params, &ctx).is_none());
    }

    #[test]
    fn test_fn_strategy() {
        let mut strategy = FnStrategy::new("always-sell", |w: &[Candle], _: &StrategyParams, _: &PositionContext| {
            w.last().map(|c| Signal::sell(c.close))
        });
        let window = [Candle::new(0, 1.0, 1.0, 1.0, 2.0, 1.0)];

        let signal = strategy
            .analyze(&window, &StrategyParams::new(), &PositionContext::flat())
            .unwrap();
        assert!(!signal.is_buy());
        assert_eq!(signal.price, 2.0);
        assert_eq!(strategy.name(), "always-sell");
    }
}

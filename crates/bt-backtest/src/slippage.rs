//! Dynamic slippage model.

use bt_core::traits::Indicator;
use bt_core::types::{Candle, CandleSlice};
use bt_indicators::{average_volume, Atr};

/// Upper bound on any computed slippage fraction.
pub const MAX_SLIPPAGE: f64 = 0.02;

const ATR_PERIOD: usize = 14;
const VOLUME_PERIOD: usize = 20;
const VOLATILITY_WEIGHT: f64 = 0.10;
const IMPACT_WEIGHT: f64 = 0.005;

/// Microstructure inputs extracted from a trailing window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarketInputs {
    pub atr: f64,
    pub avg_volume: f64,
}

impl MarketInputs {
    /// Both inputs are zero when the window was too short.
    pub fn is_empty(&self) -> bool {
        self.atr == 0.0 && self.avg_volume == 0.0
    }
}

/// Slippage fraction for one execution.
///
/// Starts at `base`, adds a volatility component, scales up when the candle's
/// volume is thin relative to its average, adds a market-impact term for the
/// order size and caps the result at [`MAX_SLIPPAGE`]. Above-average volume
/// never reduces slippage.
pub fn calculate_dynamic_slippage(
    base: f64,
    atr: f64,
    price: f64,
    volume: f64,
    avg_volume: f64,
    order_notional: f64,
) -> f64 {
    let mut slippage = base;

    if price > 0.0 && atr > 0.0 {
        slippage += (atr / price) * VOLATILITY_WEIGHT;
    }

    if avg_volume > 0.0 {
        let ratio = volume / avg_volume;
        if ratio < 0.3 {
            slippage *= 3.0;
        } else if ratio < 0.5 {
            slippage *= 2.0;
        } else if ratio < 1.0 {
            slippage *= 1.3;
        }
    }

    let avg_candle_notional = avg_volume * price;
    if avg_candle_notional > 0.0 {
        slippage += (order_notional / avg_candle_notional) * IMPACT_WEIGHT;
    }

    // NaN inputs fall through to the cap
    if slippage.is_nan() {
        return MAX_SLIPPAGE;
    }
    slippage.min(MAX_SLIPPAGE)
}

/// Simple ATR over the last 14 true ranges and average volume over the last
/// 20 candles. Windows shorter than 15 candles yield zeros.
pub fn market_inputs(window: &[Candle]) -> MarketInputs {
    if window.len() < ATR_PERIOD + 1 {
        return MarketInputs::default();
    }

    MarketInputs {
        atr: Atr::new(ATR_PERIOD).latest(window).unwrap_or(0.0),
        avg_volume: average_volume(&window.volumes(), VOLUME_PERIOD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(i: i64, close: f64, range: f64, volume: f64) -> Candle {
        Candle::new(i * 3_600_000, close, close + range / 2.0, close - range / 2.0, close, volume)
    }

    #[test]
    fn test_base_only() {
        let s = calculate_dynamic_slippage(0.001, 0.0, 100.0, 1000.0, 0.0, 0.0);
        assert!((s - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_volatility_component() {
        // 0.001 + (2/100)*0.1 = 0.003
        let s = calculate_dynamic_slippage(0.001, 2.0, 100.0, 1000.0, 0.0, 0.0);
        assert!((s - 0.003).abs() < 1e-12);
    }

    #[test]
    fn test_volume_scarcity_tiers() {
        let at = |volume: f64| calculate_dynamic_slippage(0.001, 0.0, 100.0, volume, 1000.0, 0.0);

        assert!((at(200.0) - 0.003).abs() < 1e-12);
        assert!((at(400.0) - 0.002).abs() < 1e-12);
        assert!((at(800.0) - 0.0013).abs() < 1e-12);
        assert!((at(1000.0) - 0.001).abs() < 1e-12);
        // Heavy volume never discounts
        assert!((at(5000.0) - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_market_impact() {
        // avg notional 1000 * 100 = 100_000; 10_000 / 100_000 * 0.005 = 0.0005
        let s = calculate_dynamic_slippage(0.001, 0.0, 100.0, 1000.0, 1000.0, 10_000.0);
        assert!((s - 0.0015).abs() < 1e-12);
    }

    #[test]
    fn test_cap() {
        let s = calculate_dynamic_slippage(0.01, 50.0, 100.0, 1.0, 1000.0, 1e9);
        assert_eq!(s, MAX_SLIPPAGE);
    }

    #[test]
    fn test_market_inputs_require_history() {
        let short: Vec<Candle> = (0..14).map(|i| candle(i, 100.0, 2.0, 500.0)).collect();
        assert!(market_inputs(&short).is_empty());

        let window: Vec<Candle> = (0..30).map(|i| candle(i, 100.0, 2.0, 500.0)).collect();
        let inputs = market_inputs(&window);
        assert!((inputs.atr - 2.0).abs() < 1e-12);
        assert!((inputs.avg_volume - 500.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_volume_uses_last_twenty() {
        let window: Vec<Candle> = (0..30)
            .map(|i| candle(i, 100.0, 2.0, if i < 10 { 10_000.0 } else { 100.0 }))
            .collect();
        assert!((market_inputs(&window).avg_volume - 100.0).abs() < 1e-12);
    }
}

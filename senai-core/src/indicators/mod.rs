//! Indicator pipeline.
//!
//! Single-output indicators implement the `Indicator` trait. Multi-series
//! indicators (Bollinger, MACD) expose one named instance per band as well as
//! a function returning every band at once. Ichimoku and the peak/trough
//! scanner return their own types: Ichimoku carries display offsets, and
//! the scanner looks forward.

pub mod bollinger;
pub mod ema;
pub mod ichimoku;
pub mod indicator;
pub mod macd;
pub mod peaks;
pub mod rsi;
pub mod set;
pub mod sma;

pub use bollinger::{bollinger_bands, Bollinger, BollingerBand, BollingerBands};
pub use ema::{ema, ema_of_defined, Ema};
pub use ichimoku::{ichimoku, IchimokuCloud, IchimokuParams};
pub use indicator::{Displaced, Indicator, Series};
pub use macd::{macd, Macd, MacdComponent, MacdSeries};
pub use peaks::{
    find_peaks_troughs, lookback_for_zoom, ExtremumKind, PeakTrough, DEFAULT_PEAK_LOOKBACK,
};
pub use rsi::{rsi, Rsi};
pub use set::{IndicatorRow, IndicatorSet};
pub use sma::{sma, Sma};

/// Create synthetic candles from close prices for testing.
///
/// open = prev_close (or close for the first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Candle::new(
                base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                1000,
            )
            .unwrap()
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

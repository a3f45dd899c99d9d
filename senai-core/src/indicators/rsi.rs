//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period (first defined value at index period).
//! Edge cases: avg_loss == 0 → RSI = 100, including a flat series with no
//! gains either; avg_gain == 0 with losses → RSI = 0.

use super::indicator::{closes, Indicator, Series};
use crate::domain::Candle;

/// Period used by the scoring pipeline.
pub const RSI_PERIOD: usize = 14;

/// Wilder RSI over a close-price slice.
pub fn rsi(values: &[f64], period: usize) -> Series {
    let n = values.len();
    let mut result = Series::undefined(n);
    if period == 0 || n < period + 1 {
        return result;
    }

    // Seed: average gain and average loss over the first `period` changes
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    result.set(period, rsi_from_averages(avg_gain, avg_loss));

    let p = period as f64;
    for i in (period + 1)..n {
        let change = values[i] - values[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        result.set(i, rsi_from_averages(avg_gain, avg_loss));
    }

    result
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(RSI_PERIOD)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Series {
        rsi(&closes(candles), self.period)
    }
}

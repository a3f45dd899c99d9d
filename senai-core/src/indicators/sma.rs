//! Simple Moving Average (SMA).
//!
//! Rolling mean over a lookback window.
//! Lookback: period - 1 (first defined value at index period-1).

use super::indicator::{closes, Indicator, Series};
use crate::domain::Candle;

/// SMA over an arbitrary value slice. Output length equals input length.
/// A zero period yields an all-undefined series.
pub fn sma(values: &[f64], period: usize) -> Series {
    let n = values.len();
    let mut result = Series::undefined(n);
    if period == 0 || n < period {
        return result;
    }

    let mut sum: f64 = values[..period].iter().sum();
    result.set(period - 1, sum / period as f64);

    for i in period..n {
        sum += values[i] - values[i - period];
        result.set(i, sum / period as f64);
    }

    result
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Series {
        sma(&closes(candles), self.period)
    }
}

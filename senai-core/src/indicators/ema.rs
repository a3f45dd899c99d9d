//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = k * x[t] + (1 - k) * EMA[t-1], k = 2 / (period + 1).
//! Seed: EMA[period-1] = SMA of the first `period` values.
//! Lookback: period - 1.

use super::indicator::{closes, Indicator, Series};
use crate::domain::Candle;

/// EMA over an arbitrary value slice. Output length equals input length.
pub fn ema(values: &[f64], period: usize) -> Series {
    let n = values.len();
    let mut result = Series::undefined(n);
    if period == 0 || n < period {
        return result;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    result.set(period - 1, seed);

    let mut prev = seed;
    for (i, &value) in values.iter().enumerate().skip(period) {
        let next = value * k + prev * (1.0 - k);
        result.set(i, next);
        prev = next;
    }

    result
}

/// EMA over only the defined slots of `series`, written back at the slots'
/// original indices.
///
/// The k-th defined input value feeds the k-th recurrence step, so the
/// output's first defined index is the input's (period-1)-th defined index.
pub fn ema_of_defined(series: &Series, period: usize) -> Series {
    let (indices, values): (Vec<usize>, Vec<f64>) = series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .unzip();

    let compact = ema(&values, period);
    let mut result = Series::undefined(series.len());
    for (slot, &index) in indices.iter().enumerate() {
        if let Some(v) = compact.get(slot) {
            result.set(index, v);
        }
    }
    result
}

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Series {
        ema(&closes(candles), self.period)
    }
}

//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use super::indicator::{closes, Indicator, Series};
use crate::domain::Candle;
use serde::{Deserialize, Serialize};

pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD_DEV: f64 = 2.0;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

/// All three bands, aligned with the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

/// Compute all three bands in one pass.
///
/// Each window's mean feeds both the middle band and the offsets, so
/// `lower <= middle <= upper` holds exactly for non-negative `std_dev`.
pub fn bollinger_bands(values: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    let n = values.len();
    let mut upper = Series::undefined(n);
    let mut middle = Series::undefined(n);
    let mut lower = Series::undefined(n);

    if period > 0 && n >= period {
        let multiplier = std_dev.max(0.0);
        for i in (period - 1)..n {
            let window = &values[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance = window
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            let half_width = multiplier * variance.sqrt();

            middle.set(i, mean);
            upper.set(i, mean + half_width);
            lower.set(i, mean - half_width);
        }
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

/// Single-band view for the `Indicator` trait.
#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(band: BollingerBand, period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        assert!(multiplier >= 0.0, "Bollinger multiplier must be >= 0");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{label}_{period}_{multiplier}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(BollingerBand::Upper, period, multiplier)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(BollingerBand::Middle, period, multiplier)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(BollingerBand::Lower, period, multiplier)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Series {
        let bands = bollinger_bands(&closes(candles), self.period, self.multiplier);
        match self.band {
            BollingerBand::Upper => bands.upper,
            BollingerBand::Middle => bands.middle,
            BollingerBand::Lower => bands.lower,
        }
    }
}

//! Peak/trough detector.
//!
//! Index `i` (with `L <= i < n - L`) is a peak when `high[i]` is strictly
//! greater than every other high in `[i-L, i+L]`, and a trough when `low[i]`
//! is strictly less than every other low in that window.
//!
//! Tie policy: an equal high (or low) anywhere in the window disqualifies the
//! candidate, so a flat top of two or more equal highs yields no peak at all.
//!
//! Unlike the trailing indicators this scan looks `L` candles forward, so the
//! last `L` candles can never be classified.

use crate::domain::Candle;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PEAK_LOOKBACK: usize = 20;

const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 15.0;
const MIN_ZOOM_LOOKBACK: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremumKind {
    Peak,
    Trough,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakTrough {
    pub index: usize,
    pub price: f64,
    pub kind: ExtremumKind,
    pub date: NaiveDate,
}

/// Scan for local extrema. Results come out in index order, a peak before a
/// trough at the same index. A lookback of zero, or fewer than `2L` candles,
/// yields nothing.
pub fn find_peaks_troughs(candles: &[Candle], lookback: usize) -> Vec<PeakTrough> {
    let n = candles.len();
    let mut out = Vec::new();
    if lookback == 0 || n < 2 * lookback {
        return out;
    }

    for i in lookback..(n - lookback) {
        let window = (i - lookback)..=(i + lookback);
        let high = candles[i].high();
        let low = candles[i].low();

        let is_peak = window
            .clone()
            .filter(|&j| j != i)
            .all(|j| candles[j].high() < high);
        let is_trough = window
            .filter(|&j| j != i)
            .all(|j| candles[j].low() > low);

        if is_peak {
            out.push(PeakTrough {
                index: i,
                price: high,
                kind: ExtremumKind::Peak,
                date: candles[i].date(),
            });
        }
        if is_trough {
            out.push(PeakTrough {
                index: i,
                price: low,
                kind: ExtremumKind::Trough,
                date: candles[i].date(),
            });
        }
    }

    out
}

/// Lookback for a chart zoom factor: deeper zoom shows fewer candles, so a
/// shorter window surfaces more extrema.
pub fn lookback_for_zoom(zoom: f64) -> usize {
    let zoom = if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        MIN_ZOOM
    };
    let lookback = (DEFAULT_PEAK_LOOKBACK as f64 / zoom).round() as usize;
    lookback.max(MIN_ZOOM_LOOKBACK)
}

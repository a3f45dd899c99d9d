//! Support and resistance levels.

use crate::domain::Candle;
use crate::indicators::{find_peaks_troughs, ExtremumKind};
use serde::{Deserialize, Serialize};

pub const RECENT_RANGE_WINDOW: usize = 20;
pub const SWING_PERIOD: usize = 5;
/// Swing levels closer than this fraction merge into one.
const CLUSTER_THRESHOLD: f64 = 0.02;

const SUPPORT1_FALLBACK: f64 = 0.95;
const SUPPORT2_FALLBACK: f64 = 0.90;
const RESISTANCE1_FALLBACK: f64 = 1.05;
const RESISTANCE2_FALLBACK: f64 = 1.10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyLevels {
    pub support1: f64,
    pub support2: f64,
    pub resistance1: f64,
    pub resistance2: f64,
}

impl KeyLevels {
    /// Levels from the trailing `window` candles' lows and highs.
    ///
    /// Supports are the lows below the last close sorted ascending: support1
    /// is the lowest, support2 the middle element. Resistances are the highs
    /// above the close sorted descending: resistance1 is the highest,
    /// resistance2 the middle element. Missing levels fall back to fixed
    /// multiples of the close. `None` only for an empty slice.
    pub fn from_recent_range(candles: &[Candle], window: usize) -> Option<Self> {
        let price = candles.last()?.close();
        let start = candles.len().saturating_sub(window);
        let recent = &candles[start..];

        let mut supports: Vec<f64> = recent
            .iter()
            .map(Candle::low)
            .filter(|&l| l < price)
            .collect();
        supports.sort_by(f64::total_cmp);

        let mut resistances: Vec<f64> = recent
            .iter()
            .map(Candle::high)
            .filter(|&h| h > price)
            .collect();
        resistances.sort_by(|a, b| b.total_cmp(a));

        Some(Self {
            support1: supports.first().copied().unwrap_or(price * SUPPORT1_FALLBACK),
            support2: supports
                .get(supports.len() / 2)
                .copied()
                .unwrap_or(price * SUPPORT2_FALLBACK),
            resistance1: resistances
                .first()
                .copied()
                .unwrap_or(price * RESISTANCE1_FALLBACK),
            resistance2: resistances
                .get(resistances.len() / 2)
                .copied()
                .unwrap_or(price * RESISTANCE2_FALLBACK),
        })
    }

    /// Levels from swing highs/lows found by the peak/trough scanner with
    /// lookback `period`, clustered within 2%. support1/support2 are the two
    /// nearest clusters below the close, resistance1/resistance2 the two
    /// nearest above, with the same fallbacks.
    pub fn from_swings(candles: &[Candle], period: usize) -> Option<Self> {
        let price = candles.last()?.close();
        let extrema = find_peaks_troughs(candles, period);

        let swing_highs: Vec<f64> = extrema
            .iter()
            .filter(|e| e.kind == ExtremumKind::Peak)
            .map(|e| e.price)
            .collect();
        let swing_lows: Vec<f64> = extrema
            .iter()
            .filter(|e| e.kind == ExtremumKind::Trough)
            .map(|e| e.price)
            .collect();

        // Clusters come back ascending.
        let supports: Vec<f64> = cluster_levels(&swing_lows, CLUSTER_THRESHOLD)
            .into_iter()
            .rev()
            .filter(|&l| l < price)
            .collect();
        let resistances: Vec<f64> = cluster_levels(&swing_highs, CLUSTER_THRESHOLD)
            .into_iter()
            .filter(|&h| h > price)
            .collect();

        Some(Self {
            support1: supports.first().copied().unwrap_or(price * SUPPORT1_FALLBACK),
            support2: supports.get(1).copied().unwrap_or(price * SUPPORT2_FALLBACK),
            resistance1: resistances
                .first()
                .copied()
                .unwrap_or(price * RESISTANCE1_FALLBACK),
            resistance2: resistances
                .get(1)
                .copied()
                .unwrap_or(price * RESISTANCE2_FALLBACK),
        })
    }
}

/// Merge sorted levels whose gap to the previous one is within `threshold`
/// (as a fraction of the lower level). Each cluster becomes its mean.
/// Output is ascending.
pub fn cluster_levels(levels: &[f64], threshold: f64) -> Vec<f64> {
    let mut sorted = levels.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for level in sorted {
        match clusters.last_mut() {
            Some(cluster)
                if cluster
                    .last()
                    .is_some_and(|&prev| (level - prev) / prev <= threshold) =>
            {
                cluster.push(level)
            }
            _ => clusters.push(vec![level]),
        }
    }

    clusters
        .iter()
        .map(|c| c.iter().sum::<f64>() / c.len() as f64)
        .collect()
}

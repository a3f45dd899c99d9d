//! Trend direction and moving-average crosses.

use super::returns::price_change_pct;
use crate::indicators::sma;
use serde::{Deserialize, Serialize};

/// Short-trend band: a 5-session move beyond ±2% counts as a trend.
const SHORT_TREND_BAND_PCT: f64 = 2.0;
const SHORT_TREND_LOOKBACK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Up,
    Down,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    pub short: TrendDirection,
    pub medium: TrendDirection,
}

/// Short trend from the 5-session change, medium trend from the
/// price / MA20 / MA50 stack.
pub fn trend(closes: &[f64], ma20: Option<f64>, ma50: Option<f64>) -> Trend {
    let short = match price_change_pct(closes, SHORT_TREND_LOOKBACK) {
        Some(change) if change > SHORT_TREND_BAND_PCT => TrendDirection::Up,
        Some(change) if change < -SHORT_TREND_BAND_PCT => TrendDirection::Down,
        _ => TrendDirection::Sideways,
    };

    let medium = match (closes.last(), ma20, ma50) {
        (Some(&price), Some(m20), Some(m50)) if price > m20 && m20 > m50 => TrendDirection::Up,
        (Some(&price), Some(m20), Some(m50)) if price < m20 && m20 < m50 => TrendDirection::Down,
        _ => TrendDirection::Sideways,
    };

    Trend { short, medium }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaCross {
    GoldenCross,
    DeathCross,
    None,
}

/// SMA20 vs SMA50 cross between `lookback` sessions ago and now.
pub fn ma_cross(closes: &[f64], lookback: usize) -> MaCross {
    let n = closes.len();
    if lookback == 0 || n < 50 + lookback {
        return MaCross::None;
    }
    let ma20 = sma(closes, 20);
    let ma50 = sma(closes, 50);
    let then = n - 1 - lookback;
    let now = n - 1;

    match (ma20.get(then), ma50.get(then), ma20.get(now), ma50.get(now)) {
        (Some(f0), Some(s0), Some(f1), Some(s1)) if f0 <= s0 && f1 > s1 => MaCross::GoldenCross,
        (Some(f0), Some(s0), Some(f1), Some(s1)) if f0 >= s0 && f1 < s1 => MaCross::DeathCross,
        _ => MaCross::None,
    }
}

//! Return-based statistics over close prices.

/// Trading sessions per year on HOSE.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Percent change of the last close against the close `lookback` candles
/// earlier. `None` when the history is too short or `lookback` is zero.
pub fn price_change_pct(closes: &[f64], lookback: usize) -> Option<f64> {
    let n = closes.len();
    if lookback == 0 || n <= lookback {
        return None;
    }
    let base = closes[n - 1 - lookback];
    Some((closes[n - 1] - base) / base * 100.0)
}

/// Simple returns `(c[i] - c[i-1]) / c[i-1]` for the last `period` steps.
fn trailing_returns(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    ((n - period)..n)
        .map(|i| (closes[i] - closes[i - 1]) / closes[i - 1])
        .collect()
}

/// Annualized volatility in percent: population stddev of the last `period`
/// simple returns, scaled by sqrt(252).
pub fn annualized_volatility(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let returns = trailing_returns(closes, period);
    let mean = returns.iter().sum::<f64>() / period as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / period as f64;
    Some(variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
}

/// Largest peak-to-trough decline in percent, scanning oldest to newest.
/// Zero for an empty or never-declining series.
pub fn max_drawdown(closes: &[f64]) -> f64 {
    let mut peak = match closes.first() {
        Some(&p) => p,
        None => return 0.0,
    };
    let mut worst: f64 = 0.0;
    for &c in closes {
        if c > peak {
            peak = c;
        }
        worst = worst.max((peak - c) / peak * 100.0);
    }
    worst
}

/// Horizons for the relative-strength rating: (sessions, weight).
const RS_HORIZONS: [(usize, f64); 4] = [(63, 0.4), (126, 0.2), (189, 0.2), (252, 0.2)];

/// IBD-style relative strength rating in `[0, 100]`.
///
/// Weighted 3/6/9/12-month returns over whichever horizons the history
/// covers, normalised by the weights used, then mapped from a [-50%, +100%]
/// return range onto [0, 100]. Needs at least 63 closes.
pub fn rs_rating(closes: &[f64]) -> Option<f64> {
    let n = closes.len();
    let current = *closes.last()?;

    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (horizon, weight) in RS_HORIZONS {
        if n >= horizon {
            let base = closes[n - horizon];
            weighted += (current - base) / base * 100.0 * weight;
            total_weight += weight;
        }
    }
    if total_weight == 0.0 {
        return None;
    }

    let r = weighted / total_weight;
    Some(((r + 50.0) / 150.0 * 100.0).clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn change_against_earlier_close() {
        let closes = [100.0, 104.0, 110.0];
        assert_approx(price_change_pct(&closes, 1).unwrap(), 5.769230769230769, 1e-9);
        assert_approx(price_change_pct(&closes, 2).unwrap(), 10.0, 1e-9);
        assert_eq!(price_change_pct(&closes, 3), None);
        assert_eq!(price_change_pct(&closes, 0), None);
    }

    #[test]
    fn volatility_of_constant_returns_is_zero() {
        // Every step is +10%
        let closes: Vec<f64> = (0..25).map(|i| 100.0 * 1.1f64.powi(i)).collect();
        assert_approx(annualized_volatility(&closes, 20).unwrap(), 0.0, 1e-9);
    }

    #[test]
    fn volatility_known_value() {
        // Returns alternate +10% / -10%: mean 0, stddev 0.1
        let mut closes = vec![100.0];
        for i in 0..4 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last * 1.1 } else { last * 0.9 });
        }
        let vol = annualized_volatility(&closes, 4).unwrap();
        assert_approx(vol, 0.1 * 252f64.sqrt() * 100.0, 1e-9);
    }

    #[test]
    fn volatility_needs_period_plus_one() {
        assert_eq!(annualized_volatility(&[1.0; 20], 20), None);
        assert!(annualized_volatility(&[1.0; 21], 20).is_some());
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let closes = [100.0, 120.0, 90.0, 110.0, 60.0, 130.0];
        assert_approx(max_drawdown(&closes), 50.0, 1e-9);
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn rs_rating_three_month_only() {
        // 63 closes from 100 to 125: r = 25%, rating = 75/150*100 = 50
        let mut closes = vec![100.0; 62];
        closes.push(125.0);
        assert_approx(rs_rating(&closes).unwrap(), 50.0, 1e-9);
        assert_eq!(rs_rating(&closes[..62]), None);
    }

    #[test]
    fn rs_rating_is_clamped() {
        let mut closes = vec![10.0; 62];
        closes.push(100.0);
        assert_eq!(rs_rating(&closes), Some(100.0));
        let mut falling = vec![100.0; 62];
        falling.push(30.0);
        assert_eq!(rs_rating(&falling), Some(0.0));
    }
}

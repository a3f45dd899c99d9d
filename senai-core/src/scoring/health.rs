//! Stock health card: session change, RS rating and a fundamental score.

use super::diagnosis::{fundamental_score, FUNDAMENTAL_MAX, FUNDAMENTAL_MIN};
use crate::analytics::{price_change_pct, rs_rating};
use crate::domain::{CandleSeries, FundamentalSnapshot};
use crate::rng::FallbackScoreSource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundamentalSource {
    /// Rescaled from reported ratios.
    Reported,
    /// Placeholder drawn from a `FallbackScoreSource`.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHealth {
    pub symbol: String,
    pub change_pct: f64,
    /// 0..=100, `None` with under 63 closes.
    pub rs_rating: Option<u8>,
    pub fundamental_score: u8,
    pub fundamental_source: FundamentalSource,
}

/// The fundamental sub-score mapped linearly from its reachable range onto
/// 0..=100.
pub fn rescaled_fundamental_score(f: &FundamentalSnapshot) -> u8 {
    let raw = fundamental_score(f).clamp(FUNDAMENTAL_MIN, FUNDAMENTAL_MAX);
    let span = (FUNDAMENTAL_MAX - FUNDAMENTAL_MIN) as f64;
    ((raw - FUNDAMENTAL_MIN) as f64 / span * 100.0).round() as u8
}

/// Health card for the last candle. The fallback source is consulted only
/// when `fundamentals` carries no ratio at all. `None` for an empty series.
pub fn stock_health(
    series: &CandleSeries,
    fundamentals: &FundamentalSnapshot,
    fallback: &dyn FallbackScoreSource,
) -> Option<StockHealth> {
    let last = series.last()?;
    let closes = series.closes();

    let (fundamental_score, fundamental_source) = if fundamentals.is_empty() {
        (
            fallback.fallback_score(series.symbol(), last.date()),
            FundamentalSource::Fallback,
        )
    } else {
        (
            rescaled_fundamental_score(fundamentals),
            FundamentalSource::Reported,
        )
    };

    Some(StockHealth {
        symbol: series.symbol().to_string(),
        change_pct: price_change_pct(&closes, 1).unwrap_or(0.0),
        rs_rating: rs_rating(&closes).map(|r| r.round() as u8),
        fundamental_score,
        fundamental_source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;
    use crate::rng::{FixedFallback, SeededFallback};

    fn series(n: usize) -> CandleSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        CandleSeries::new("VCB", make_candles(&closes)).unwrap()
    }

    #[test]
    fn reported_fundamentals_are_rescaled() {
        let f = FundamentalSnapshot {
            pe: Some(5.0),
            pb: Some(0.5),
            roe: Some(30.0),
            ..Default::default()
        };
        assert_eq!(rescaled_fundamental_score(&f), 100);
        let weak = FundamentalSnapshot {
            roe: Some(1.0),
            ..Default::default()
        };
        // raw -3 → (8/41)*100 ≈ 19.5
        assert_eq!(rescaled_fundamental_score(&weak), 20);
    }

    #[test]
    fn empty_fundamentals_use_injected_fallback() {
        let h = stock_health(&series(70), &FundamentalSnapshot::default(), &FixedFallback(0.25))
            .unwrap();
        assert_eq!(h.fundamental_score, 75);
        assert_eq!(h.fundamental_source, FundamentalSource::Fallback);
        assert!(h.rs_rating.is_some());
    }

    #[test]
    fn seeded_fallback_is_repeatable() {
        let source = SeededFallback::new(2024);
        let a = stock_health(&series(10), &FundamentalSnapshot::default(), &source).unwrap();
        let b = stock_health(&series(10), &FundamentalSnapshot::default(), &source).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.rs_rating, None);
    }

    #[test]
    fn empty_series_has_no_card() {
        let empty = CandleSeries::empty("VCB");
        let fundamentals = FundamentalSnapshot::default();
        assert!(stock_health(&empty, &fundamentals, &FixedFallback(0.0)).is_none());
    }
}

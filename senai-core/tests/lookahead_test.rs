//! Look-ahead contamination tests for the indicator pipeline.
//!
//! Invariant: no indicator value at candle t may depend on candle t+1 or
//! later. The peak/trough scanner is the one deliberate exception; it may
//! only confirm an extremum once `lookback` candles follow it.
//!
//! Method: compute on a truncated series (0..150) and the full series
//! (0..300) and assert the overlapping values are identical.

use chrono::NaiveDate;
use senai_core::domain::Candle;
use senai_core::indicators::*;

/// Deterministic pseudo-random walk, always valid OHLC.
fn make_test_candles(n: usize) -> Vec<Candle> {
    let base_date = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();
    let mut price = 25_000.0_f64;

    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            let change = ((seed >> 33) % 200) as f64 - 100.0; // -100 to +99
            price = (price + change * 5.0).max(1_000.0);

            let open = price - 50.0;
            let close = price + 30.0;
            let high = open.max(close) + 200.0;
            let low = open.min(close) - 200.0;
            Candle::new(
                base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                1_000_000 + (i as u64 * 1_000),
            )
            .unwrap()
        })
        .collect()
}

fn assert_series_prefix_equal(name: &str, truncated: &Series, full: &Series, len: usize) {
    assert_eq!(truncated.len(), len, "{name}: truncated length mismatch");
    for i in 0..len {
        assert_eq!(
            truncated.get(i),
            full.get(i),
            "{name}: look-ahead detected at candle {i}"
        );
    }
}

fn assert_no_lookahead(indicator: &dyn Indicator, candles: &[Candle], truncated_len: usize) {
    let full = indicator.compute(candles);
    let truncated = indicator.compute(&candles[..truncated_len]);
    assert_eq!(full.len(), candles.len(), "{}: full length mismatch", indicator.name());
    assert_series_prefix_equal(indicator.name(), &truncated, &full, truncated_len);
}

const FULL: usize = 300;
const TRUNCATED: usize = 150;

#[test]
fn moving_averages_have_no_lookahead() {
    let candles = make_test_candles(FULL);
    for period in [5, 10, 20, 50, 200] {
        assert_no_lookahead(&Sma::new(period), &candles, TRUNCATED);
    }
    for period in [12, 26] {
        assert_no_lookahead(&Ema::new(period), &candles, TRUNCATED);
    }
}

#[test]
fn oscillators_have_no_lookahead() {
    let candles = make_test_candles(FULL);
    assert_no_lookahead(&Rsi::default(), &candles, TRUNCATED);
    assert_no_lookahead(&Bollinger::upper(20, 2.0), &candles, TRUNCATED);
    assert_no_lookahead(&Bollinger::middle(20, 2.0), &candles, TRUNCATED);
    assert_no_lookahead(&Bollinger::lower(20, 2.0), &candles, TRUNCATED);
    for component in [
        MacdComponent::Line,
        MacdComponent::Signal,
        MacdComponent::Histogram,
    ] {
        assert_no_lookahead(&Macd::standard(component), &candles, TRUNCATED);
    }
}

#[test]
fn ichimoku_raw_arrays_have_no_lookahead() {
    let candles = make_test_candles(FULL);
    let full = ichimoku(&candles, IchimokuParams::default());
    let truncated = ichimoku(&candles[..TRUNCATED], IchimokuParams::default());

    assert_series_prefix_equal("tenkan", &truncated.tenkan, &full.tenkan, TRUNCATED);
    assert_series_prefix_equal("kijun", &truncated.kijun, &full.kijun, TRUNCATED);
    assert_series_prefix_equal(
        "senkou_a",
        &truncated.senkou_a.values,
        &full.senkou_a.values,
        TRUNCATED,
    );
    assert_series_prefix_equal(
        "senkou_b",
        &truncated.senkou_b.values,
        &full.senkou_b.values,
        TRUNCATED,
    );
    assert_series_prefix_equal(
        "chikou",
        &truncated.chikou.values,
        &full.chikou.values,
        TRUNCATED,
    );
}

#[test]
fn indicator_set_rows_are_stable() {
    let candles = make_test_candles(FULL);
    let full = IndicatorSet::compute(&candles);
    let truncated = IndicatorSet::compute(&candles[..TRUNCATED]);
    for i in 0..TRUNCATED {
        assert_eq!(
            truncated.row(&candles[..TRUNCATED], i),
            full.row(&candles, i),
            "indicator row {i} changed when later candles were added"
        );
    }
}

#[test]
fn peaks_are_final_once_confirmed() {
    let candles = make_test_candles(FULL);
    let lookback = DEFAULT_PEAK_LOOKBACK;
    let confirmed = |p: &PeakTrough| p.index + lookback < TRUNCATED;

    let full: Vec<_> = find_peaks_troughs(&candles, lookback)
        .into_iter()
        .filter(confirmed)
        .collect();
    let truncated: Vec<_> = find_peaks_troughs(&candles[..TRUNCATED], lookback)
        .into_iter()
        .filter(confirmed)
        .collect();
    assert_eq!(truncated, full);
}

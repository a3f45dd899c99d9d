//! Criterion benchmarks for the SenAI hot paths.
//!
//! Benchmarks:
//! 1. Full indicator precompute (`IndicatorSet`) over 2,000 candles
//! 2. Individual indicators on the same series
//! 3. Peak/trough scan at several zoom-derived lookbacks
//! 4. Snapshot + diagnosis + risk + strategy for one symbol

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use senai_core::analytics::{annualized_volatility, max_drawdown, KeyLevels, RECENT_RANGE_WINDOW};
use senai_core::domain::{Candle, FundamentalSnapshot};
use senai_core::indicators::{
    bollinger_bands, ema, find_peaks_troughs, ichimoku, lookback_for_zoom, macd, rsi, sma,
    IchimokuParams, IndicatorSet,
};
use senai_core::scoring::{assess_risk, diagnose, plan_strategy, SenAIInput, TechnicalSnapshot};

// ── Helpers ──────────────────────────────────────────────────────────

const SERIES_LEN: usize = 2_000;

fn make_candles(n: usize) -> Vec<Candle> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2016, 1, 4).unwrap();
    (0..n)
        .map(|i| {
            let close = 25_000.0 + (i as f64 * 0.1).sin() * 2_500.0 + i as f64 * 2.0;
            let open = close - 80.0;
            Candle::new(
                base_date + chrono::Duration::days(i as i64),
                open,
                close + 300.0,
                open - 300.0,
                close,
                1_000_000 + (i as u64 % 500_000),
            )
            .unwrap()
        })
        .collect()
}

// ── 1. Indicator set ─────────────────────────────────────────────────

fn bench_indicator_set(c: &mut Criterion) {
    let candles = make_candles(SERIES_LEN);
    c.bench_function("indicator_set_2000", |b| {
        b.iter(|| IndicatorSet::compute(black_box(&candles)))
    });
}

// ── 2. Individual indicators ─────────────────────────────────────────

fn bench_individual(c: &mut Criterion) {
    let candles = make_candles(SERIES_LEN);
    let closes: Vec<f64> = candles.iter().map(Candle::close).collect();
    let mut group = c.benchmark_group("indicators_2000");

    group.bench_function("sma200", |b| b.iter(|| sma(black_box(&closes), 200)));
    group.bench_function("ema26", |b| b.iter(|| ema(black_box(&closes), 26)));
    group.bench_function("rsi14", |b| b.iter(|| rsi(black_box(&closes), 14)));
    group.bench_function("bollinger20", |b| {
        b.iter(|| bollinger_bands(black_box(&closes), 20, 2.0))
    });
    group.bench_function("macd", |b| b.iter(|| macd(black_box(&closes), 12, 26, 9)));
    group.bench_function("ichimoku", |b| {
        b.iter(|| ichimoku(black_box(&candles), IchimokuParams::default()))
    });
    group.finish();
}

// ── 3. Peaks ─────────────────────────────────────────────────────────

fn bench_peaks(c: &mut Criterion) {
    let candles = make_candles(SERIES_LEN);
    let mut group = c.benchmark_group("peaks_2000");
    for zoom in [1.0, 2.0, 5.0] {
        let lookback = lookback_for_zoom(zoom);
        group.bench_with_input(BenchmarkId::from_parameter(lookback), &lookback, |b, &l| {
            b.iter(|| find_peaks_troughs(black_box(&candles), l))
        });
    }
    group.finish();
}

// ── 4. Scoring ───────────────────────────────────────────────────────

fn bench_scoring(c: &mut Criterion) {
    let candles = make_candles(SERIES_LEN);
    let set = IndicatorSet::compute(&candles);
    let closes: Vec<f64> = candles.iter().map(Candle::close).collect();
    let fundamentals = FundamentalSnapshot {
        pe: Some(12.0),
        pb: Some(1.8),
        roe: Some(19.0),
        ..Default::default()
    };

    c.bench_function("score_symbol", |b| {
        b.iter(|| {
            let technical = TechnicalSnapshot::from_series(black_box(&candles), &set).unwrap();
            let levels = KeyLevels::from_recent_range(&candles, RECENT_RANGE_WINDOW).unwrap();
            let volatility = annualized_volatility(&closes, 20).unwrap_or(0.0);
            let drawdown = max_drawdown(&closes[closes.len() - 252..]);
            let input = SenAIInput::new("BENCH", technical, fundamentals.clone());
            (
                diagnose(&input),
                assess_risk(&input, volatility, drawdown),
                plan_strategy(&input.technical, &levels),
            )
        })
    });
}

criterion_group!(
    benches,
    bench_indicator_set,
    bench_individual,
    bench_peaks,
    bench_scoring
);
criterion_main!(benches);

//! Single-symbol analysis: fetch, compute indicators and analytics, score.
//!
//! `analyze_series` is the pure half and never touches a provider;
//! `analyze_symbol` wraps it with the fetch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use senai_core::analytics::{
    annualized_volatility, atr, ma_cross, max_drawdown, price_change_pct, trend, KeyLevels,
    MaCross, Trend, RECENT_RANGE_WINDOW, YEAR_WINDOW,
};
use senai_core::config::{AnalysisConfig, ConfigError};
use senai_core::data::{DataError, DataProvider};
use senai_core::domain::{CandleSeries, FundamentalSnapshot};
use senai_core::indicators::{find_peaks_troughs, IndicatorSet, PeakTrough};
use senai_core::rng::{FallbackScoreSource, SeededFallback};
use senai_core::scoring::{
    assess_risk, diagnose, plan_strategy, stock_health, Diagnosis, Risk, SenAIInput,
    StockHealth, Strategy, TechnicalSnapshot,
};

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Fewer candles than this and a symbol is not scored.
pub const MIN_CANDLES: usize = 50;

const VOLATILITY_PERIOD: usize = 20;
const ATR_PERIOD: usize = 14;
const CROSS_LOOKBACK: usize = 5;

/// Master seed for the health-card placeholder score.
pub const DEFAULT_FALLBACK_SEED: u64 = 42;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Percent change of the last close over common horizons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceChanges {
    pub d1: Option<f64>,
    pub d5: Option<f64>,
    pub d20: Option<f64>,
    pub d60: Option<f64>,
}

impl PriceChanges {
    fn from_closes(closes: &[f64]) -> Self {
        Self {
            d1: price_change_pct(closes, 1),
            d5: price_change_pct(closes, 5),
            d20: price_change_pct(closes, 20),
            d60: price_change_pct(closes, 60),
        }
    }
}

/// Everything computed for one symbol on one analysis date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub schema_version: u32,
    pub symbol: String,
    pub analysis_date: NaiveDate,
    /// Date of the last candle the analysis saw.
    pub last_candle_date: NaiveDate,
    pub candle_count: usize,

    pub technical: TechnicalSnapshot,
    pub fundamentals: FundamentalSnapshot,
    pub changes: PriceChanges,
    pub atr14: Option<f64>,
    pub trend: Trend,
    pub ma_cross: MaCross,
    pub levels: KeyLevels,

    pub diagnosis: Diagnosis,
    pub risk: Risk,
    /// Tick-rounded.
    pub strategy: Strategy,
    pub health: Option<StockHealth>,
    pub peaks: Vec<PeakTrough>,
}

impl AnalysisReport {
    pub fn score(&self) -> u8 {
        self.diagnosis.score
    }
}

/// Fetch `symbol` from `provider` and analyze it as of `as_of`.
pub fn analyze_symbol(
    provider: &dyn DataProvider,
    symbol: &str,
    config: &AnalysisConfig,
    as_of: NaiveDate,
) -> Result<AnalysisReport, RunError> {
    analyze_symbol_with(
        provider,
        symbol,
        config,
        as_of,
        &SeededFallback::new(DEFAULT_FALLBACK_SEED),
    )
}

/// As `analyze_symbol`, with an explicit placeholder-score source.
pub fn analyze_symbol_with(
    provider: &dyn DataProvider,
    symbol: &str,
    config: &AnalysisConfig,
    as_of: NaiveDate,
    fallback: &dyn FallbackScoreSource,
) -> Result<AnalysisReport, RunError> {
    config.validate()?;
    let series = provider.fetch_history(symbol, config.history_days)?;
    debug!(symbol, candles = series.len(), provider = provider.name(), "fetched history");

    // Ratios are optional: a symbol without them still gets a technical read.
    let fundamentals = match provider.fetch_fundamentals(symbol) {
        Ok(f) => f,
        Err(e) => {
            warn!(symbol, error = %e, "fundamentals unavailable, scoring without them");
            FundamentalSnapshot::default()
        }
    };

    analyze_series(&series, fundamentals, config, as_of, fallback)
}

/// Score an already-fetched series. Pure.
pub fn analyze_series(
    series: &CandleSeries,
    fundamentals: FundamentalSnapshot,
    config: &AnalysisConfig,
    as_of: NaiveDate,
    fallback: &dyn FallbackScoreSource,
) -> Result<AnalysisReport, RunError> {
    let symbol = series.symbol();
    let insufficient = || DataError::InsufficientHistory {
        symbol: symbol.to_string(),
        required: MIN_CANDLES,
        available: series.len(),
    };
    if series.len() < MIN_CANDLES {
        return Err(insufficient().into());
    }

    let candles = series.candles();
    let last_candle_date = series.last().ok_or_else(insufficient)?.date();
    let closes = series.closes();

    let indicators = IndicatorSet::with_bollinger_std_dev(candles, config.bollinger_std_dev);
    let technical = TechnicalSnapshot::from_series(candles, &indicators).ok_or_else(insufficient)?;
    let levels =
        KeyLevels::from_recent_range(candles, RECENT_RANGE_WINDOW).ok_or_else(insufficient)?;

    let volatility = annualized_volatility(&closes, VOLATILITY_PERIOD).unwrap_or(0.0);
    let drawdown = max_drawdown(&closes[closes.len().saturating_sub(YEAR_WINDOW)..]);

    let health = stock_health(series, &fundamentals, fallback);
    let input = SenAIInput::new(symbol, technical, fundamentals);
    let diagnosis = diagnose(&input);
    let risk = assess_risk(&input, volatility, drawdown);
    let strategy = plan_strategy(&input.technical, &levels).rounded_to_tick();

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        symbol: symbol.to_string(),
        analysis_date: as_of,
        last_candle_date,
        candle_count: series.len(),
        changes: PriceChanges::from_closes(&closes),
        atr14: atr(candles, ATR_PERIOD),
        trend: trend(&closes, indicators.ma20.last(), indicators.ma50.last()),
        ma_cross: ma_cross(&closes, CROSS_LOOKBACK),
        levels,
        diagnosis,
        risk,
        strategy,
        health,
        peaks: find_peaks_troughs(candles, config.peak_lookback),
        technical: input.technical,
        fundamentals: input.fundamentals,
    })
}

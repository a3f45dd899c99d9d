//! Data provider trait and structured error types.
//!
//! `DataProvider` abstracts over where candles and ratios come from (the
//! hosted REST backend, a directory of CSV files) so the runner can swap
//! implementations and tests can use fixtures.

use crate::config::ConfigError;
use crate::domain::{Candle, CandleSeries, FundamentalSnapshot, RawCandle};
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by backend (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: backend has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("{symbol}: need at least {required} candles, got {available}")]
    InsufficientHistory {
        symbol: String,
        required: usize,
        available: usize,
    },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid fundamentals file {path}: {reason}")]
    Fundamentals { path: PathBuf, reason: String },

    #[error("cache error: {0}")]
    Cache(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Other(String),
}

/// Source of daily history and current ratios for a symbol.
///
/// The insight cache and the narrative generator sit beside this trait;
/// providers know nothing about them.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// The most recent `days` sessions, ascending by date, deduplicated.
    fn fetch_history(&self, symbol: &str, days: usize) -> Result<CandleSeries, DataError>;

    /// Latest reported ratios. An unknown symbol yields an empty snapshot,
    /// not an error.
    fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalSnapshot, DataError>;

    /// False while the provider refuses requests (e.g. breaker open).
    fn is_available(&self) -> bool {
        true
    }
}

/// Validate raw rows into a series: invalid rows are skipped with a warning,
/// the rest sorted and deduplicated (last occurrence wins), then trimmed to
/// the trailing `days`.
pub fn assemble_series(
    symbol: &str,
    rows: impl IntoIterator<Item = RawCandle>,
    days: usize,
) -> CandleSeries {
    let mut candles = Vec::new();
    let mut skipped = 0usize;
    for raw in rows {
        match Candle::try_from(raw) {
            Ok(candle) => candles.push(candle),
            Err(e) => {
                skipped += 1;
                warn!(symbol, error = %e, "skipping invalid candle");
            }
        }
    }
    if skipped > 0 {
        warn!(symbol, skipped, kept = candles.len(), "dropped invalid rows");
    }
    let mut series = CandleSeries::from_unordered(symbol, candles);
    series.truncate_front(days);
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(day: u32, close: f64) -> RawCandle {
        RawCandle {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close + 100.0,
            low: close - 100.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn assemble_sorts_dedupes_and_trims() {
        let mut broken = raw(4, 25_000.0);
        broken.high = 1.0;
        let rows = vec![
            raw(5, 25_500.0),
            broken,
            raw(3, 24_800.0),
            raw(1, 24_000.0),
            raw(3, 24_900.0),
        ];
        let series = assemble_series("FPT", rows, 2);
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![24_900.0, 25_500.0]);
        assert_eq!(series.symbol(), "FPT");
    }

    #[test]
    fn error_messages_name_the_symbol() {
        let e = DataError::InsufficientHistory {
            symbol: "VNM".into(),
            required: 50,
            available: 12,
        };
        assert_eq!(e.to_string(), "VNM: need at least 50 candles, got 12");
    }
}

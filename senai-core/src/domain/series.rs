//! CandleSeries: chronologically ascending candles for one symbol.

use super::candle::Candle;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("{symbol}: candle dated {date} is not after {previous}")]
    NotAscending {
        symbol: String,
        previous: NaiveDate,
        date: NaiveDate,
    },
}

/// Ordered OHLCV history for one instrument.
///
/// Dates are strictly ascending (no duplicates). Indicator functions take
/// `candles()` as read-only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    symbol: String,
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Strict constructor: rejects any candle not strictly after its predecessor.
    pub fn new(symbol: impl Into<String>, candles: Vec<Candle>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        for pair in candles.windows(2) {
            if pair[1].date() <= pair[0].date() {
                return Err(SeriesError::NotAscending {
                    symbol,
                    previous: pair[0].date(),
                    date: pair[1].date(),
                });
            }
        }
        Ok(Self { symbol, candles })
    }

    /// Sort by date and drop duplicate dates, keeping the last occurrence.
    ///
    /// Used for provider output, which arrives newest-first and may repeat a
    /// session after a partial re-sync.
    pub fn from_unordered(symbol: impl Into<String>, mut candles: Vec<Candle>) -> Self {
        // Stable sort keeps arrival order among equal dates.
        candles.sort_by_key(|c| c.date());
        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last_mut() {
                Some(last) if last.date() == candle.date() => *last = candle,
                _ => deduped.push(candle),
            }
        }
        Self {
            symbol: symbol.into(),
            candles: deduped,
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            candles: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// The trailing `n` candles (or all of them when shorter).
    pub fn tail(&self, n: usize) -> &[Candle] {
        let start = self.candles.len().saturating_sub(n);
        &self.candles[start..]
    }

    /// Keep only the trailing `n` candles.
    pub fn truncate_front(&mut self, n: usize) {
        let start = self.candles.len().saturating_sub(n);
        self.candles.drain(..start);
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(Candle::close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(Candle::high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(Candle::low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume() as f64).collect()
    }
}

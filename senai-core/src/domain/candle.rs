//! Candle: one trading-day OHLCV observation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a candle is rejected at construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleError {
    #[error("{date}: non-finite {field} value")]
    NonFinite { date: NaiveDate, field: &'static str },

    #[error("{date}: {field} must be positive, got {value}")]
    NonPositive {
        date: NaiveDate,
        field: &'static str,
        value: f64,
    },

    #[error("{date}: OHLC out of order (open={open}, high={high}, low={low}, close={close})")]
    OutOfRange {
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
}

/// Unvalidated candle as it arrives from a CSV file or a REST row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawCandle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily OHLCV candle.
///
/// Invariant: all prices are finite and positive, `low <= open, close <= high`.
/// Fields are private so the invariant cannot be broken after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCandle", into = "RawCandle")]
pub struct Candle {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl Candle {
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, CandleError> {
        for (field, value) in [("open", open), ("high", high), ("low", low), ("close", close)] {
            if !value.is_finite() {
                return Err(CandleError::NonFinite { date, field });
            }
            if value <= 0.0 {
                return Err(CandleError::NonPositive { date, field, value });
            }
        }

        let ordered = low <= high
            && low <= open
            && open <= high
            && low <= close
            && close <= high;
        if !ordered {
            return Err(CandleError::OutOfRange {
                date,
                open,
                high,
                low,
                close,
            });
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn open(&self) -> f64 {
        self.open
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn close(&self) -> f64 {
        self.close
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    /// Greatest of high-low, |high-prev_close|, |low-prev_close|.
    pub fn true_range(&self, prev_close: f64) -> f64 {
        (self.high - self.low)
            .max((self.high - prev_close).abs())
            .max((self.low - prev_close).abs())
    }
}

impl TryFrom<RawCandle> for Candle {
    type Error = CandleError;

    fn try_from(raw: RawCandle) -> Result<Self, Self::Error> {
        Candle::new(raw.date, raw.open, raw.high, raw.low, raw.close, raw.volume)
    }
}

impl From<Candle> for RawCandle {
    fn from(c: Candle) -> Self {
        RawCandle {
            date: c.date,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: c.volume,
        }
    }
}

//! Scorer input: a point-in-time technical snapshot plus fundamentals.

use crate::analytics::{average_volume, price_change_pct, price_position, YEAR_WINDOW};
use crate::domain::{Candle, FundamentalSnapshot};
use crate::indicators::{IndicatorSet, Series};
use serde::{Deserialize, Serialize};

/// RSI assumed when fewer than 15 candles exist.
pub const NEUTRAL_RSI: f64 = 50.0;
const VOLUME_AVERAGE_PERIOD: usize = 20;

/// Technical half of the scorer input, read off the last candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub current_price: f64,
    /// One-session change, in percent.
    pub price_change_pct: f64,
    pub ma20: f64,
    pub ma50: f64,
    pub ma200: f64,
    pub rsi14: f64,
    /// Position inside the 52-week range, 0..=100.
    pub price_position: f64,
    pub volume: f64,
    /// 20-session average volume; `None` with under 20 candles.
    pub avg_volume: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
}

impl TechnicalSnapshot {
    /// Snapshot at the last candle. `None` for an empty slice.
    ///
    /// Moving averages without a full window fall back to the mean of every
    /// close available, so a young listing still compares its price against
    /// its own history. RSI falls back to 50.
    pub fn from_series(candles: &[Candle], indicators: &IndicatorSet) -> Option<Self> {
        let last = candles.last()?;
        let closes: Vec<f64> = candles.iter().map(Candle::close).collect();
        let full_mean = closes.iter().sum::<f64>() / closes.len() as f64;
        let ma = |series: &Series| series.last().unwrap_or(full_mean);

        Some(Self {
            current_price: last.close(),
            price_change_pct: price_change_pct(&closes, 1).unwrap_or(0.0),
            ma20: ma(&indicators.ma20),
            ma50: ma(&indicators.ma50),
            ma200: ma(&indicators.ma200),
            rsi14: indicators.rsi14.last().unwrap_or(NEUTRAL_RSI),
            price_position: price_position(candles, YEAR_WINDOW).unwrap_or(50.0),
            volume: last.volume() as f64,
            avg_volume: average_volume(candles, VOLUME_AVERAGE_PERIOD),
            macd: indicators.macd.macd.last(),
            macd_signal: indicators.macd.signal.last(),
        })
    }

    /// Volume against its 20-session average; 1.0 when the average is
    /// unknown or zero.
    pub fn volume_ratio(&self) -> f64 {
        match self.avg_volume {
            Some(avg) if avg > 0.0 => self.volume / avg,
            _ => 1.0,
        }
    }
}

/// Everything the diagnosis, risk and strategy scorers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenAIInput {
    pub symbol: String,
    pub technical: TechnicalSnapshot,
    pub fundamentals: FundamentalSnapshot,
}

impl SenAIInput {
    pub fn new(
        symbol: impl Into<String>,
        technical: TechnicalSnapshot,
        fundamentals: FundamentalSnapshot,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            technical,
            fundamentals,
        }
    }
}

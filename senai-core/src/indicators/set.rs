//! IndicatorSet: every series the scoring pipeline reads, computed once.

use super::bollinger::{bollinger_bands, BollingerBands, BOLLINGER_PERIOD, BOLLINGER_STD_DEV};
use super::ema::ema;
use super::ichimoku::{ichimoku, IchimokuCloud, IchimokuParams};
use super::indicator::Series;
use super::macd::{macd, MacdSeries, MACD_FAST, MACD_SIGNAL, MACD_SLOW};
use super::rsi::{rsi, RSI_PERIOD};
use super::sma::sma;
use crate::domain::Candle;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Parallel series, one slot per input candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub ma5: Series,
    pub ma10: Series,
    pub ma20: Series,
    pub ma50: Series,
    pub ma200: Series,
    pub ema12: Series,
    pub ema26: Series,
    pub rsi14: Series,
    pub bollinger: BollingerBands,
    pub macd: MacdSeries,
    pub ichimoku: IchimokuCloud,
}

/// One candle's worth of indicator values, for tabular output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub ema12: Option<f64>,
    pub ema26: Option<f64>,
    pub rsi14: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub tenkan: Option<f64>,
    pub kijun: Option<f64>,
}

impl IndicatorSet {
    pub fn compute(candles: &[Candle]) -> Self {
        Self::with_bollinger_std_dev(candles, BOLLINGER_STD_DEV)
    }

    pub fn with_bollinger_std_dev(candles: &[Candle], std_dev: f64) -> Self {
        let closes: Vec<f64> = candles.iter().map(Candle::close).collect();
        Self {
            ma5: sma(&closes, 5),
            ma10: sma(&closes, 10),
            ma20: sma(&closes, 20),
            ma50: sma(&closes, 50),
            ma200: sma(&closes, 200),
            ema12: ema(&closes, MACD_FAST),
            ema26: ema(&closes, MACD_SLOW),
            rsi14: rsi(&closes, RSI_PERIOD),
            bollinger: bollinger_bands(&closes, BOLLINGER_PERIOD, std_dev),
            macd: macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL),
            ichimoku: ichimoku(candles, IchimokuParams::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.ma20.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ma20.is_empty()
    }

    /// Values at `index`; `None` when `index` is past the end of `candles`.
    pub fn row(&self, candles: &[Candle], index: usize) -> Option<IndicatorRow> {
        let candle = candles.get(index)?;
        Some(IndicatorRow {
            date: candle.date(),
            close: candle.close(),
            ma5: self.ma5.get(index),
            ma10: self.ma10.get(index),
            ma20: self.ma20.get(index),
            ma50: self.ma50.get(index),
            ema12: self.ema12.get(index),
            ema26: self.ema26.get(index),
            rsi14: self.rsi14.get(index),
            bb_upper: self.bollinger.upper.get(index),
            bb_middle: self.bollinger.middle.get(index),
            bb_lower: self.bollinger.lower.get(index),
            macd: self.macd.macd.get(index),
            macd_signal: self.macd.signal.get(index),
            macd_histogram: self.macd.histogram.get(index),
            tenkan: self.ichimoku.tenkan.get(index),
            kijun: self.ichimoku.kijun.get(index),
        })
    }
}

//! MACD (12, 26, 9).
//!
//! - Line: EMA(fast) - EMA(slow), defined from index slow-1.
//! - Signal: EMA(signal) over the defined part of the line only, written back
//!   at the line's own indices. First defined at slow-1 + signal-1.
//! - Histogram: line - signal at the same candle index.

use super::ema::{ema, ema_of_defined};
use super::indicator::{closes, Indicator, Series};
use crate::domain::Candle;
use serde::{Deserialize, Serialize};

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdComponent {
    Line,
    Signal,
    Histogram,
}

/// Line, signal and histogram, all indexed by candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
}

pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);
    let line = fast_ema.zip_with(&slow_ema, |f, s| f - s);
    let signal_line = ema_of_defined(&line, signal);
    let histogram = line.zip_with(&signal_line, |m, s| m - s);

    MacdSeries {
        macd: line,
        signal: signal_line,
        histogram,
    }
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    component: MacdComponent,
    name: String,
}

impl Macd {
    pub fn new(component: MacdComponent, fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(slow > fast, "MACD slow period must exceed fast period");
        let label = match component {
            MacdComponent::Line => "line",
            MacdComponent::Signal => "signal",
            MacdComponent::Histogram => "histogram",
        };
        Self {
            fast,
            slow,
            signal,
            component,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn standard(component: MacdComponent) -> Self {
        Self::new(component, MACD_FAST, MACD_SLOW, MACD_SIGNAL)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.component {
            MacdComponent::Line => self.slow - 1,
            MacdComponent::Signal | MacdComponent::Histogram => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, candles: &[Candle]) -> Series {
        let all = macd(&closes(candles), self.fast, self.slow, self.signal);
        match self.component {
            MacdComponent::Line => all.macd,
            MacdComponent::Signal => all.signal,
            MacdComponent::Histogram => all.histogram,
        }
    }
}

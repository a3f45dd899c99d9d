//! Indicator trait and the `Series` container it produces.
//!
//! Indicators are pure functions: candle history in, one value slot per
//! candle out. Slots without enough history are `None`; there is no numeric
//! sentinel a consumer could mistake for a price.

use crate::domain::Candle;
use serde::{Deserialize, Serialize};

/// One optional value per input candle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series(Vec<Option<f64>>);

impl Series {
    /// A series of `len` undefined slots.
    pub fn undefined(len: usize) -> Self {
        Self(vec![None; len])
    }

    pub fn from_values(values: Vec<Option<f64>>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value at `index`; `None` when out of range or undefined.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied().flatten()
    }

    /// Value in the final slot.
    pub fn last(&self) -> Option<f64> {
        self.0.last().copied().flatten()
    }

    pub fn set(&mut self, index: usize, value: f64) {
        self.0[index] = Some(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Option<f64>] {
        &self.0
    }

    /// Index of the first defined slot.
    pub fn first_defined(&self) -> Option<usize> {
        self.0.iter().position(Option::is_some)
    }

    pub fn defined_count(&self) -> usize {
        self.0.iter().filter(|v| v.is_some()).count()
    }

    /// Combine two equal-length series slot by slot; undefined if either side is.
    pub fn zip_with(&self, other: &Series, f: impl Fn(f64, f64) -> f64) -> Series {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(f(*a, *b)),
                _ => None,
            })
            .collect()
    }
}

impl FromIterator<Option<f64>> for Series {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A series whose values are computed at the current index but are meant to
/// be drawn `display_offset` periods away on a time axis.
///
/// Positive offsets plot forward (Senkou spans), negative ones backward
/// (Chikou). The values themselves are never shifted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Displaced {
    pub values: Series,
    pub display_offset: isize,
}

impl Displaced {
    pub fn new(values: Series, display_offset: isize) -> Self {
        Self {
            values,
            display_offset,
        }
    }

    /// Axis position where the value computed at `index` is plotted.
    /// May fall before the first candle or past the last one.
    pub fn display_index(&self, index: usize) -> isize {
        index as isize + self.display_offset
    }

    /// The value plotted at axis position `display_index`, if any.
    pub fn value_at_display(&self, display_index: isize) -> Option<f64> {
        let source = display_index - self.display_offset;
        if source < 0 {
            return None;
        }
        self.values.get(source as usize)
    }
}

/// Trait for single-output indicators.
///
/// `compute` returns a `Series` of the same length as `candles`. The first
/// `lookback()` slots are `None`.
///
/// # Look-ahead contamination guard
/// No value at index t may depend on candles after t. Every indicator must
/// pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of candles needed before the first defined value.
    fn lookback(&self) -> usize;

    fn compute(&self, candles: &[Candle]) -> Series;
}

/// Close prices of a candle slice.
pub(crate) fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(Candle::close).collect()
}

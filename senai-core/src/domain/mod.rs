//! Domain types: candles, series, fundamentals, price ticks.

pub mod candle;
pub mod fundamentals;
pub mod series;
pub mod tick;

pub use candle::{Candle, CandleError, RawCandle};
pub use fundamentals::FundamentalSnapshot;
pub use series::{CandleSeries, SeriesError};
pub use tick::{round_to_tick, tick_size, TickPolicy};

/// Symbol type alias
pub type Symbol = String;

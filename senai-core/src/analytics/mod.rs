//! Series analytics: returns, ranges, trend and key levels.
//!
//! Point-in-time statistics read off the tail of a series. Like the
//! indicators they are pure and never look past the last candle supplied.

pub mod levels;
pub mod range;
pub mod returns;
pub mod trend;

pub use levels::{cluster_levels, KeyLevels, RECENT_RANGE_WINDOW, SWING_PERIOD};
pub use range::{atr, average_volume, high_low, price_position, volume_ratio, YEAR_WINDOW};
pub use returns::{
    annualized_volatility, max_drawdown, price_change_pct, rs_rating, TRADING_DAYS_PER_YEAR,
};
pub use trend::{ma_cross, trend, MaCross, Trend, TrendDirection};

//! Range and volume statistics over candles.

use crate::domain::Candle;

/// Sessions in the 52-week window.
pub const YEAR_WINDOW: usize = 252;

/// Highest high and lowest low over the trailing `window` candles.
pub fn high_low(candles: &[Candle], window: usize) -> Option<(f64, f64)> {
    let start = candles.len().saturating_sub(window);
    let recent = &candles[start..];
    if recent.is_empty() {
        return None;
    }
    let high = recent.iter().map(Candle::high).fold(f64::MIN, f64::max);
    let low = recent.iter().map(Candle::low).fold(f64::MAX, f64::min);
    Some((high, low))
}

/// Where the last close sits inside the trailing high/low range, 0..=100.
/// A degenerate range reads 50.
pub fn price_position(candles: &[Candle], window: usize) -> Option<f64> {
    let close = candles.last()?.close();
    let (high, low) = high_low(candles, window)?;
    if high == low {
        return Some(50.0);
    }
    Some(((close - low) / (high - low) * 100.0).clamp(0.0, 100.0))
}

/// Mean volume over the trailing `period` candles.
pub fn average_volume(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period {
        return None;
    }
    let recent = &candles[candles.len() - period..];
    Some(recent.iter().map(|c| c.volume() as f64).sum::<f64>() / period as f64)
}

/// Last volume over the trailing average. `None` when the average is zero.
pub fn volume_ratio(candles: &[Candle], period: usize) -> Option<f64> {
    let avg = average_volume(candles, period)?;
    if avg == 0.0 {
        return None;
    }
    Some(candles.last()?.volume() as f64 / avg)
}

/// Average true range: simple mean of the last `period` true ranges.
pub fn atr(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }
    let n = candles.len();
    let sum: f64 = ((n - period)..n)
        .map(|i| candles[i].true_range(candles[i - 1].close()))
        .sum();
    Some(sum / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles};

    #[test]
    fn position_in_range() {
        // highs run to 111, lows from 99; last close 110
        let candles = make_candles(&(100..=110).map(f64::from).collect::<Vec<_>>());
        let pos = price_position(&candles, YEAR_WINDOW).unwrap();
        assert_approx(pos, (110.0 - 99.0) / (111.0 - 99.0) * 100.0, 1e-9);
    }

    #[test]
    fn volume_ratio_against_average() {
        let mut candles = make_candles(&[10.0; 5]);
        let last = candles[4];
        candles[4] = Candle::new(
            last.date(),
            last.open(),
            last.high(),
            last.low(),
            last.close(),
            3000,
        )
        .unwrap();
        // average of 1000 x4 + 3000 = 1400
        assert_approx(volume_ratio(&candles, 5).unwrap(), 3000.0 / 1400.0, 1e-12);
        assert_eq!(volume_ratio(&candles, 6), None);
    }

    #[test]
    fn zero_volume_average_is_undefined() {
        let candles: Vec<Candle> = make_candles(&[10.0; 3])
            .into_iter()
            .map(|c| Candle::new(c.date(), c.open(), c.high(), c.low(), c.close(), 0).unwrap())
            .collect();
        assert_eq!(volume_ratio(&candles, 3), None);
    }

    #[test]
    fn atr_of_steady_ramp() {
        // Each candle: open = prev close, range = |step| + 2, no gap beyond that
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        assert_approx(atr(&candles, 3).unwrap(), 3.0, 1e-12);
        assert_eq!(atr(&candles, 5), None);
    }
}

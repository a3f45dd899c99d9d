//! Ichimoku Cloud.
//!
//! Every line is computed at the candle's own index. Senkou A/B are drawn
//! `displacement` periods ahead and Chikou the same distance behind; that
//! shift is carried as `Displaced::display_offset`, never applied to the data.

use super::indicator::{Displaced, Series};
use crate::domain::Candle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IchimokuParams {
    pub tenkan: usize,
    pub kijun: usize,
    pub senkou_b: usize,
    pub displacement: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            tenkan: 9,
            kijun: 26,
            senkou_b: 52,
            displacement: 26,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IchimokuCloud {
    pub tenkan: Series,
    pub kijun: Series,
    /// (tenkan + kijun) / 2, plotted forward.
    pub senkou_a: Displaced,
    /// Long-window midpoint, plotted forward.
    pub senkou_b: Displaced,
    /// Close, plotted backward.
    pub chikou: Displaced,
}

/// Midpoint of the highest high and lowest low over each trailing window.
fn midpoint(candles: &[Candle], period: usize) -> Series {
    let n = candles.len();
    let mut result = Series::undefined(n);
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &candles[i + 1 - period..=i];
        let high = window.iter().map(Candle::high).fold(f64::MIN, f64::max);
        let low = window.iter().map(Candle::low).fold(f64::MAX, f64::min);
        result.set(i, (high + low) / 2.0);
    }
    result
}

pub fn ichimoku(candles: &[Candle], params: IchimokuParams) -> IchimokuCloud {
    let tenkan = midpoint(candles, params.tenkan);
    let kijun = midpoint(candles, params.kijun);
    let senkou_a = tenkan.zip_with(&kijun, |t, k| (t + k) / 2.0);
    let senkou_b = midpoint(candles, params.senkou_b);
    let chikou: Series = candles.iter().map(|c| Some(c.close())).collect();

    let offset = params.displacement as isize;
    IchimokuCloud {
        tenkan,
        kijun,
        senkou_a: Displaced::new(senkou_a, offset),
        senkou_b: Displaced::new(senkou_b, offset),
        chikou: Displaced::new(chikou, -offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    fn ramp(n: usize) -> Vec<Candle> {
        make_candles(&(0..n).map(|i| 100.0 + i as f64).collect::<Vec<_>>())
    }

    #[test]
    fn warmup_lengths() {
        let cloud = ichimoku(&ramp(60), IchimokuParams::default());
        assert_eq!(cloud.tenkan.first_defined(), Some(8));
        assert_eq!(cloud.kijun.first_defined(), Some(25));
        assert_eq!(cloud.senkou_a.values.first_defined(), Some(25));
        assert_eq!(cloud.senkou_b.values.first_defined(), Some(51));
        assert_eq!(cloud.chikou.values.first_defined(), Some(0));
    }

    #[test]
    fn tenkan_is_window_midpoint() {
        // make_candles: high = max(open,close)+1, low = min(open,close)-1
        // Index 8 window covers closes 100..=108, opens 100..=107
        let candles = ramp(10);
        let cloud = ichimoku(&candles, IchimokuParams::default());
        let expected = (109.0 + 99.0) / 2.0;
        assert_approx(cloud.tenkan.get(8).unwrap(), expected, DEFAULT_EPSILON);
    }

    #[test]
    fn senkou_a_averages_tenkan_and_kijun() {
        let cloud = ichimoku(&ramp(40), IchimokuParams::default());
        for i in 25..40 {
            let expected = (cloud.tenkan.get(i).unwrap() + cloud.kijun.get(i).unwrap()) / 2.0;
            assert_approx(cloud.senkou_a.values.get(i).unwrap(), expected, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn offsets_are_explicit() {
        let candles = ramp(60);
        let cloud = ichimoku(&candles, IchimokuParams::default());
        assert_eq!(cloud.senkou_a.display_offset, 26);
        assert_eq!(cloud.senkou_b.display_offset, 26);
        assert_eq!(cloud.chikou.display_offset, -26);
        // Chikou value plotted at axis 0 is the close from index 26
        assert_eq!(cloud.chikou.value_at_display(0), Some(candles[26].close()));
    }
}

//! SenAI Core: domain types, indicators, series analytics, composite scoring.
//!
//! This crate contains the analytical heart of SenAI:
//! - Domain types (candles, series, fundamental ratios, price ticks)
//! - Indicator pipeline (SMA/EMA, RSI, Bollinger, MACD, Ichimoku, peaks)
//! - Point-in-time series analytics (returns, volatility, key levels)
//! - Rule-based Diagnosis / Risk / Strategy scoring
//! - Data collaborators (REST backend, CSV import, insight cache)
//!
//! Indicators and scorers are pure functions of their inputs. All I/O lives
//! in `data` and `config`.

pub mod analytics;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod rng;
pub mod scoring;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the runner moves across rayon workers
    /// is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::CandleSeries>();
        require_sync::<domain::CandleSeries>();
        require_send::<domain::FundamentalSnapshot>();
        require_sync::<domain::FundamentalSnapshot>();

        // Indicator outputs
        require_send::<indicators::Series>();
        require_sync::<indicators::Series>();
        require_send::<indicators::IndicatorSet>();
        require_sync::<indicators::IndicatorSet>();
        require_send::<indicators::PeakTrough>();
        require_sync::<indicators::PeakTrough>();

        // Scoring outputs
        require_send::<scoring::Diagnosis>();
        require_sync::<scoring::Diagnosis>();
        require_send::<scoring::Risk>();
        require_sync::<scoring::Risk>();
        require_send::<scoring::Strategy>();
        require_sync::<scoring::Strategy>();
        require_send::<scoring::StockHealth>();
        require_sync::<scoring::StockHealth>();

        // Collaborators
        require_send::<data::RestBackend>();
        require_sync::<data::RestBackend>();
        require_send::<data::CsvProvider>();
        require_sync::<data::CsvProvider>();
        require_send::<data::MemoryInsightCache>();
        require_sync::<data::MemoryInsightCache>();
        require_send::<rng::SeededFallback>();
        require_sync::<rng::SeededFallback>();
    }

    /// Architecture contract: indicators see only the candles they are given.
    ///
    /// `Indicator::compute` takes `&[Candle]` and nothing else, so an
    /// indicator cannot reach a provider or a clock.
    #[test]
    fn indicator_trait_takes_only_candles() {
        fn _check_trait_object_builds(
            ind: &dyn indicators::Indicator,
            candles: &[domain::Candle],
        ) -> indicators::Series {
            ind.compute(candles)
        }
    }
}

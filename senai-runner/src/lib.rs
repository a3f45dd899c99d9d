//! SenAI Runner: single-symbol analysis, universe batches, export, publishing.
//!
//! This crate builds on `senai-core` to provide:
//! - `analyze_symbol`: provider in, scored `AnalysisReport` out
//! - `run_batch`: the VN30 (or any) universe in parallel on rayon
//! - JSON / CSV report export
//! - Publishing reports back to the backend through `AnalysisSink`

pub mod analysis;
pub mod batch;
pub mod config;
pub mod export;
pub mod publish;
pub mod universe;

pub use analysis::{
    analyze_series, analyze_symbol, analyze_symbol_with, AnalysisReport, PriceChanges, RunError,
    MIN_CANDLES, SCHEMA_VERSION,
};
pub use batch::{run_batch, BatchFailure, BatchProgress, BatchSummary, TracingProgress};
pub use config::{BatchConfig, RunnerConfig};
pub use export::{export_json, export_summary_csv, import_json, save_reports};
pub use publish::{publish_all, AnalysisSink, JsonFileSink, PublishOutcome};
pub use universe::{vn30, VN30};

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use senai_core::data::{DataError, DataProvider};
    use senai_core::domain::{Candle, CandleSeries, FundamentalSnapshot};

    /// Slow 40-candle sine wave on an upward drift, always valid OHLC.
    pub fn wave_series(symbol: &str, n: usize) -> CandleSeries {
        let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let close_at = |i: usize| {
            let t = i as f64;
            25_000.0 + 2_000.0 * (t * std::f64::consts::TAU / 40.0).sin() + 10.0 * t
        };
        let candles = (0..n)
            .map(|i| {
                let close = close_at(i);
                let open = if i == 0 { close } else { close_at(i - 1) };
                Candle::new(
                    base + chrono::Duration::days(i as i64),
                    open,
                    open.max(close) + 50.0,
                    open.min(close) - 50.0,
                    close,
                    1_000_000 + i as u64 * 100,
                )
                .unwrap()
            })
            .collect();
        CandleSeries::new(symbol, candles).unwrap()
    }

    /// In-memory provider over pre-built series.
    pub struct FixtureProvider {
        pub series: HashMap<String, CandleSeries>,
        pub fundamentals: HashMap<String, FundamentalSnapshot>,
    }

    impl DataProvider for FixtureProvider {
        fn name(&self) -> &str {
            "fixture"
        }

        fn fetch_history(&self, symbol: &str, days: usize) -> Result<CandleSeries, DataError> {
            let mut series = self
                .series
                .get(symbol)
                .cloned()
                .ok_or_else(|| DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })?;
            series.truncate_front(days);
            Ok(series)
        }

        fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalSnapshot, DataError> {
            Ok(self.fundamentals.get(symbol).cloned().unwrap_or_default())
        }
    }

    /// One wave series of the given length per symbol.
    pub fn fixture_provider(symbols: &[(&str, usize)]) -> FixtureProvider {
        FixtureProvider {
            series: symbols
                .iter()
                .map(|&(s, n)| (s.to_string(), wave_series(s, n)))
                .collect(),
            fundamentals: HashMap::new(),
        }
    }
}

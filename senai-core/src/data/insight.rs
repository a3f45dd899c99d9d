//! Narrative insight: a day-keyed cache in front of an AI narrative
//! generator.
//!
//! Records are keyed by `(symbol, analysis date)` and written with
//! insert-or-update semantics. There is no expiry beyond the date key: a new
//! trading day simply misses.

use super::provider::DataError;
use super::rest::{RestBackend, SYMBOL_DATE_KEY};
use crate::analytics::Trend;
use crate::domain::FundamentalSnapshot;
use crate::scoring::{Recommendation, TechnicalSnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub const INSIGHTS_TABLE: &str = "ai_stock_insights";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalNarrative {
    pub trend: String,
    pub support: String,
    pub resistance: String,
    pub pattern: String,
    pub signal: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalNarrative {
    pub valuation: String,
    pub growth: String,
    pub financial: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetBand {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

/// One generated commentary for a symbol on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub symbol: String,
    pub analysis_date: NaiveDate,
    pub sentiment: Sentiment,
    /// 0..=100.
    pub confidence: u8,
    pub technical: TechnicalNarrative,
    pub fundamental: FundamentalNarrative,
    pub summary: String,
    pub recommendation: Recommendation,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
    pub target_price: Option<TargetBand>,
    /// Set by `InsightService`, never stored.
    #[serde(skip)]
    pub from_cache: bool,
}

/// What the narrative generator is told about a stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsBrief {
    pub symbol: String,
    /// Date of the last candle; also the cache key date.
    pub as_of: NaiveDate,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub current_price: f64,
    pub price_change_pct: f64,
    pub volume: f64,
    pub fundamentals: FundamentalSnapshot,
    pub ma20: f64,
    pub ma50: f64,
    pub rsi14: f64,
    pub trend: Option<Trend>,
}

impl FundamentalsBrief {
    pub fn new(
        symbol: impl Into<String>,
        as_of: NaiveDate,
        technical: &TechnicalSnapshot,
        fundamentals: &FundamentalSnapshot,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            as_of,
            company_name: None,
            industry: None,
            current_price: technical.current_price,
            price_change_pct: technical.price_change_pct,
            volume: technical.volume,
            fundamentals: fundamentals.clone(),
            ma20: technical.ma20,
            ma50: technical.ma50,
            rsi14: technical.rsi14,
            trend: None,
        }
    }

    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = Some(trend);
        self
    }

    pub fn with_company(mut self, name: impl Into<String>, industry: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self.industry = Some(industry.into());
        self
    }
}

pub trait InsightCache: Send + Sync {
    fn get(&self, symbol: &str, date: NaiveDate) -> Result<Option<InsightRecord>, DataError>;

    /// Insert, or replace the record with the same `(symbol, date)`.
    fn upsert(&self, record: &InsightRecord) -> Result<(), DataError>;
}

/// The AI collaborator. `chart_png` is a rendered candlestick chart when the
/// caller has one.
pub trait NarrativeProvider: Send + Sync {
    fn generate(
        &self,
        brief: &FundamentalsBrief,
        chart_png: Option<&[u8]>,
    ) -> Result<InsightRecord, DataError>;
}

#[derive(Debug, Default)]
pub struct MemoryInsightCache {
    records: Mutex<HashMap<(String, NaiveDate), InsightRecord>>,
}

impl MemoryInsightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InsightCache for MemoryInsightCache {
    fn get(&self, symbol: &str, date: NaiveDate) -> Result<Option<InsightRecord>, DataError> {
        let records = self
            .records
            .lock()
            .map_err(|_| DataError::Cache("insight cache lock poisoned".into()))?;
        Ok(records.get(&(symbol.to_string(), date)).cloned())
    }

    fn upsert(&self, record: &InsightRecord) -> Result<(), DataError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| DataError::Cache("insight cache lock poisoned".into()))?;
        records.insert((record.symbol.clone(), record.analysis_date), record.clone());
        Ok(())
    }
}

/// Flat `ai_stock_insights` row.
#[derive(Debug, Serialize, Deserialize)]
struct InsightRow {
    symbol: String,
    analysis_date: NaiveDate,
    overall_sentiment: Sentiment,
    confidence_score: u8,
    recommendation: Recommendation,
    #[serde(default)]
    tech_trend: Option<String>,
    #[serde(default)]
    tech_support: Option<String>,
    #[serde(default)]
    tech_resistance: Option<String>,
    #[serde(default)]
    tech_pattern: Option<String>,
    #[serde(default)]
    tech_signal: Option<String>,
    #[serde(default)]
    fund_valuation: Option<String>,
    #[serde(default)]
    fund_growth: Option<String>,
    #[serde(default)]
    fund_financial: Option<String>,
    #[serde(default)]
    short_summary: Option<String>,
    #[serde(default)]
    strengths: Option<Vec<String>>,
    #[serde(default)]
    risks: Option<Vec<String>>,
    #[serde(default)]
    target_low: Option<f64>,
    #[serde(default)]
    target_mid: Option<f64>,
    #[serde(default)]
    target_high: Option<f64>,
}

impl From<&InsightRecord> for InsightRow {
    fn from(r: &InsightRecord) -> Self {
        InsightRow {
            symbol: r.symbol.clone(),
            analysis_date: r.analysis_date,
            overall_sentiment: r.sentiment,
            confidence_score: r.confidence,
            recommendation: r.recommendation,
            tech_trend: Some(r.technical.trend.clone()),
            tech_support: Some(r.technical.support.clone()),
            tech_resistance: Some(r.technical.resistance.clone()),
            tech_pattern: Some(r.technical.pattern.clone()),
            tech_signal: Some(r.technical.signal.clone()),
            fund_valuation: Some(r.fundamental.valuation.clone()),
            fund_growth: Some(r.fundamental.growth.clone()),
            fund_financial: Some(r.fundamental.financial.clone()),
            short_summary: Some(r.summary.clone()),
            strengths: Some(r.strengths.clone()),
            risks: Some(r.risks.clone()),
            target_low: r.target_price.map(|t| t.low),
            target_mid: r.target_price.map(|t| t.mid),
            target_high: r.target_price.map(|t| t.high),
        }
    }
}

impl From<InsightRow> for InsightRecord {
    fn from(row: InsightRow) -> Self {
        let target_price = match (row.target_low, row.target_mid, row.target_high) {
            (Some(low), Some(mid), Some(high)) => Some(TargetBand { low, mid, high }),
            _ => None,
        };
        InsightRecord {
            symbol: row.symbol,
            analysis_date: row.analysis_date,
            sentiment: row.overall_sentiment,
            confidence: row.confidence_score,
            technical: TechnicalNarrative {
                trend: row.tech_trend.unwrap_or_default(),
                support: row.tech_support.unwrap_or_default(),
                resistance: row.tech_resistance.unwrap_or_default(),
                pattern: row.tech_pattern.unwrap_or_default(),
                signal: row.tech_signal.unwrap_or_default(),
            },
            fundamental: FundamentalNarrative {
                valuation: row.fund_valuation.unwrap_or_default(),
                growth: row.fund_growth.unwrap_or_default(),
                financial: row.fund_financial.unwrap_or_default(),
            },
            summary: row.short_summary.unwrap_or_default(),
            recommendation: row.recommendation,
            strengths: row.strengths.unwrap_or_default(),
            risks: row.risks.unwrap_or_default(),
            target_price,
            from_cache: false,
        }
    }
}

/// Insight cache stored in the backend's `ai_stock_insights` table.
pub struct RestInsightCache {
    backend: Arc<RestBackend>,
}

impl RestInsightCache {
    pub fn new(backend: Arc<RestBackend>) -> Self {
        Self { backend }
    }
}

impl InsightCache for RestInsightCache {
    fn get(&self, symbol: &str, date: NaiveDate) -> Result<Option<InsightRecord>, DataError> {
        let rows: Vec<InsightRow> = self.backend.select(
            INSIGHTS_TABLE,
            &[
                ("symbol", format!("eq.{symbol}")),
                ("analysis_date", format!("eq.{date}")),
                ("limit", "1".to_string()),
            ],
        )?;
        Ok(rows.into_iter().next().map(InsightRecord::from))
    }

    fn upsert(&self, record: &InsightRecord) -> Result<(), DataError> {
        self.backend
            .upsert(INSIGHTS_TABLE, SYMBOL_DATE_KEY, &InsightRow::from(record))
    }
}

/// Cache-first access to narrative insights.
pub struct InsightService<C, N> {
    cache: C,
    narrator: N,
}

impl<C: InsightCache, N: NarrativeProvider> InsightService<C, N> {
    pub fn new(cache: C, narrator: N) -> Self {
        Self { cache, narrator }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Return today's cached insight for `brief.symbol` unless `bypass_cache`
    /// is set; otherwise generate, store and return a fresh one.
    ///
    /// Cache failures are logged and do not fail the call; generation
    /// failures do.
    pub fn get_or_generate(
        &self,
        brief: &FundamentalsBrief,
        chart_png: Option<&[u8]>,
        bypass_cache: bool,
    ) -> Result<InsightRecord, DataError> {
        if !bypass_cache {
            match self.cache.get(&brief.symbol, brief.as_of) {
                Ok(Some(mut cached)) => {
                    debug!(symbol = %brief.symbol, date = %brief.as_of, "insight cache hit");
                    cached.from_cache = true;
                    return Ok(cached);
                }
                Ok(None) => debug!(symbol = %brief.symbol, "insight cache miss"),
                Err(e) => warn!(symbol = %brief.symbol, error = %e, "insight cache read failed"),
            }
        }

        let mut record = self.narrator.generate(brief, chart_png)?;
        record.symbol = brief.symbol.clone();
        record.analysis_date = brief.as_of;
        record.from_cache = false;
        info!(
            symbol = %record.symbol,
            recommendation = %record.recommendation,
            "generated insight"
        );

        if let Err(e) = self.cache.upsert(&record) {
            warn!(symbol = %record.symbol, error = %e, "insight cache write failed");
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::input::fixtures::neutral_technical;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingNarrator {
        calls: AtomicUsize,
    }

    impl NarrativeProvider for CountingNarrator {
        fn generate(
            &self,
            brief: &FundamentalsBrief,
            chart_png: Option<&[u8]>,
        ) -> Result<InsightRecord, DataError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(InsightRecord {
                symbol: "ignored".into(),
                analysis_date: NaiveDate::MIN,
                sentiment: Sentiment::Neutral,
                confidence: 60,
                technical: TechnicalNarrative::default(),
                fundamental: FundamentalNarrative::default(),
                summary: format!("call {n}, chart={}", chart_png.is_some()),
                recommendation: if brief.rsi14 > 70.0 {
                    Recommendation::Ban
                } else {
                    Recommendation::TheoDoi
                },
                strengths: vec![],
                risks: vec![],
                target_price: None,
                from_cache: false,
            })
        }
    }

    struct FailingCache;

    impl InsightCache for FailingCache {
        fn get(&self, _: &str, _: NaiveDate) -> Result<Option<InsightRecord>, DataError> {
            Err(DataError::Cache("down".into()))
        }
        fn upsert(&self, _: &InsightRecord) -> Result<(), DataError> {
            Err(DataError::Cache("down".into()))
        }
    }

    fn narrator() -> CountingNarrator {
        CountingNarrator {
            calls: AtomicUsize::new(0),
        }
    }

    fn brief(day: u32) -> FundamentalsBrief {
        FundamentalsBrief::new(
            "FPT",
            NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            &neutral_technical(),
            &FundamentalSnapshot::default(),
        )
    }

    #[test]
    fn second_call_same_day_hits_cache() {
        let service = InsightService::new(MemoryInsightCache::new(), narrator());
        let first = service.get_or_generate(&brief(6), None, false).unwrap();
        assert!(!first.from_cache);
        assert_eq!(first.symbol, "FPT");
        assert_eq!(first.analysis_date, brief(6).as_of);

        let second = service.get_or_generate(&brief(6), None, false).unwrap();
        assert!(second.from_cache);
        assert_eq!(second.summary, first.summary);
        assert_eq!(service.narrator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn new_day_misses_and_bypass_regenerates() {
        let service = InsightService::new(MemoryInsightCache::new(), narrator());
        service.get_or_generate(&brief(6), None, false).unwrap();
        service.get_or_generate(&brief(7), None, false).unwrap();
        let forced = service.get_or_generate(&brief(7), Some(&[0x89, b'P']), true).unwrap();
        assert!(!forced.from_cache);
        assert_eq!(forced.summary, "call 2, chart=true");
        // bypass still upserts over the same key
        assert_eq!(service.cache().len(), 2);
    }

    #[test]
    fn cache_failures_do_not_fail_generation() {
        let service = InsightService::new(FailingCache, narrator());
        let record = service.get_or_generate(&brief(6), None, false).unwrap();
        assert!(!record.from_cache);
    }

    #[test]
    fn row_conversion_keeps_target_band() {
        let record = InsightRecord {
            target_price: Some(TargetBand {
                low: 24_000.0,
                mid: 27_000.0,
                high: 30_000.0,
            }),
            symbol: "FPT".into(),
            analysis_date: brief(6).as_of,
            strengths: vec!["Tài chính lành mạnh".into()],
            ..narrator().generate(&brief(6), None).unwrap()
        };
        let json = serde_json::to_string(&InsightRow::from(&record)).unwrap();
        assert!(json.contains("\"overall_sentiment\":\"NEUTRAL\""));
        assert!(json.contains("\"recommendation\":\"THEO DÕI\""));
        let back: InsightRecord = serde_json::from_str::<InsightRow>(&json).unwrap().into();
        assert_eq!(back, record);
    }
}

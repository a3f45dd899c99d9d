//! Publishing finished reports.
//!
//! `AnalysisSink` is the seam; the backend implementation upserts one row
//! per report into each of the three result tables, keyed by
//! `(symbol, analysis_date)`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use senai_core::data::{DataError, RestBackend, SYMBOL_DATE_KEY};

use crate::analysis::AnalysisReport;
use crate::batch::BatchFailure;

pub const AI_ANALYSIS_TABLE: &str = "ai_analysis";
pub const RISK_ANALYSIS_TABLE: &str = "risk_analysis";
pub const TRADING_STRATEGY_TABLE: &str = "trading_strategy";

/// Somewhere a report can be sent.
pub trait AnalysisSink: Send + Sync {
    fn name(&self) -> &str;

    fn publish(&self, report: &AnalysisReport) -> Result<(), DataError>;
}

// ─── Backend rows ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiAnalysisRow<'a> {
    pub symbol: &'a str,
    pub analysis_date: NaiveDate,
    pub rating: u8,
    pub score: u8,
    pub signal: i8,
    pub recommendation: &'static str,
    pub confidence: u8,
}

impl<'a> From<&'a AnalysisReport> for AiAnalysisRow<'a> {
    fn from(r: &'a AnalysisReport) -> Self {
        Self {
            symbol: &r.symbol,
            analysis_date: r.analysis_date,
            rating: r.diagnosis.rating,
            score: r.diagnosis.score,
            signal: r.diagnosis.signal.into(),
            recommendation: r.diagnosis.recommendation.label(),
            confidence: r.diagnosis.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAnalysisRow<'a> {
    pub symbol: &'a str,
    pub analysis_date: NaiveDate,
    pub optimal_holding_days: u32,
    pub upside_probability: f64,
    pub downside_risk: f64,
    pub volatility: f64,
    pub beta: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl<'a> From<&'a AnalysisReport> for RiskAnalysisRow<'a> {
    fn from(r: &'a AnalysisReport) -> Self {
        let risk = &r.risk;
        Self {
            symbol: &r.symbol,
            analysis_date: r.analysis_date,
            optimal_holding_days: risk.optimal_holding_days,
            upside_probability: risk.upside_probability,
            downside_risk: risk.downside_risk,
            volatility: risk.volatility,
            beta: risk.beta,
            sharpe_ratio: risk.sharpe_ratio,
            max_drawdown: risk.max_drawdown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingStrategyRow<'a> {
    pub symbol: &'a str,
    pub analysis_date: NaiveDate,
    pub buy_zone_low: f64,
    pub buy_zone_high: f64,
    pub stop_loss: f64,
    pub target_1: f64,
    pub target_2: f64,
    pub target_3: f64,
    pub support_1: f64,
    pub support_2: f64,
    pub resistance_1: f64,
    pub resistance_2: f64,
    pub strategy_type: &'static str,
    pub strategy_note: &'a str,
}

impl<'a> From<&'a AnalysisReport> for TradingStrategyRow<'a> {
    fn from(r: &'a AnalysisReport) -> Self {
        let s = &r.strategy;
        Self {
            symbol: &r.symbol,
            analysis_date: r.analysis_date,
            buy_zone_low: s.buy_zone_low,
            buy_zone_high: s.buy_zone_high,
            stop_loss: s.stop_loss,
            target_1: s.target1,
            target_2: s.target2,
            target_3: s.target3,
            support_1: r.levels.support1,
            support_2: r.levels.support2,
            resistance_1: r.levels.resistance1,
            resistance_2: r.levels.resistance2,
            strategy_type: s.strategy_type.label(),
            strategy_note: &s.strategy_note,
        }
    }
}

impl AnalysisSink for RestBackend {
    fn name(&self) -> &str {
        "rest_backend"
    }

    fn publish(&self, report: &AnalysisReport) -> Result<(), DataError> {
        self.upsert(AI_ANALYSIS_TABLE, SYMBOL_DATE_KEY, &AiAnalysisRow::from(report))?;
        self.upsert(RISK_ANALYSIS_TABLE, SYMBOL_DATE_KEY, &RiskAnalysisRow::from(report))?;
        self.upsert(
            TRADING_STRATEGY_TABLE,
            SYMBOL_DATE_KEY,
            &TradingStrategyRow::from(report),
        )?;
        Ok(())
    }
}

// ─── File sink ──────────────────────────────────────────────────────

/// Writes `{SYMBOL}_{YYYY-MM-DD}.json` into a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, report: &AnalysisReport) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", report.symbol, report.analysis_date))
    }
}

impl AnalysisSink for JsonFileSink {
    fn name(&self) -> &str {
        "json_file"
    }

    fn publish(&self, report: &AnalysisReport) -> Result<(), DataError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| DataError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| DataError::Other(format!("cannot encode report: {e}")))?;
        let path = self.path_for(report);
        std::fs::write(&path, json).map_err(|source| DataError::Io { path, source })
    }
}

// ─── Driver ─────────────────────────────────────────────────────────

/// Outcome of publishing a set of reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    pub published: usize,
    pub failures: Vec<BatchFailure>,
}

/// Publish every report in order. A tripped circuit breaker stops the run;
/// any other failure is recorded and the next report is tried.
pub fn publish_all(sink: &dyn AnalysisSink, reports: &[AnalysisReport]) -> PublishOutcome {
    let mut outcome = PublishOutcome::default();
    for (i, report) in reports.iter().enumerate() {
        match sink.publish(report) {
            Ok(()) => outcome.published += 1,
            Err(DataError::CircuitBreakerTripped) => {
                warn!(sink = sink.name(), "circuit breaker open, skipping remaining reports");
                outcome
                    .failures
                    .extend(reports[i..].iter().map(|r| BatchFailure {
                        symbol: r.symbol.clone(),
                        error: DataError::CircuitBreakerTripped.to_string(),
                    }));
                break;
            }
            Err(e) => {
                warn!(sink = sink.name(), symbol = %report.symbol, error = %e, "publish failed");
                outcome.failures.push(BatchFailure {
                    symbol: report.symbol.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    info!(
        sink = sink.name(),
        published = outcome.published,
        failed = outcome.failures.len(),
        "publish finished"
    );
    outcome
}

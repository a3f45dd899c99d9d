//! Universe-wide batch analysis.
//!
//! Symbols are independent, so the batch is a `par_iter` over the universe.
//! A failing symbol is recorded and skipped; it never aborts the run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use senai_core::config::AnalysisConfig;
use senai_core::data::DataProvider;

use crate::analysis::{analyze_symbol, AnalysisReport, RunError};
use crate::config::BatchConfig;

/// A symbol the batch could not score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub symbol: String,
    pub error: String,
}

/// Result of a batch run. Reports are sorted by descending score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub analysis_date: NaiveDate,
    pub reports: Vec<AnalysisReport>,
    pub failures: Vec<BatchFailure>,
    pub elapsed_secs: f64,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.reports.len() + self.failures.len()
    }

    /// The `n` best-scoring reports.
    pub fn top(&self, n: usize) -> &[AnalysisReport] {
        &self.reports[..n.min(self.reports.len())]
    }
}

/// Progress callbacks. Called from worker threads.
pub trait BatchProgress: Sync {
    fn on_start(&self, _total: usize) {}

    fn on_symbol(
        &self,
        symbol: &str,
        outcome: Result<&AnalysisReport, &RunError>,
        completed: usize,
        total: usize,
    );

    fn on_finish(&self, _summary: &BatchSummary) {}
}

/// Logs progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl BatchProgress for TracingProgress {
    fn on_start(&self, total: usize) {
        info!(total, "batch started");
    }

    fn on_symbol(
        &self,
        symbol: &str,
        outcome: Result<&AnalysisReport, &RunError>,
        completed: usize,
        total: usize,
    ) {
        match outcome {
            Ok(report) => info!(
                symbol,
                score = report.score(),
                recommendation = %report.diagnosis.recommendation,
                "[{completed}/{total}] analyzed"
            ),
            Err(e) => warn!(symbol, error = %e, "[{completed}/{total}] failed"),
        }
    }

    fn on_finish(&self, summary: &BatchSummary) {
        info!(
            analyzed = summary.reports.len(),
            failed = summary.failures.len(),
            elapsed_secs = summary.elapsed_secs,
            "batch finished"
        );
    }
}

/// Analyze every symbol of `batch.universe` as of `as_of`.
///
/// Errors only if the worker pool cannot be built; per-symbol failures land
/// in `BatchSummary::failures`.
pub fn run_batch(
    provider: &dyn DataProvider,
    batch: &BatchConfig,
    analysis: &AnalysisConfig,
    as_of: NaiveDate,
    progress: &dyn BatchProgress,
) -> Result<BatchSummary> {
    let start = Instant::now();
    let symbols = &batch.universe;
    let total = symbols.len();
    let completed = AtomicUsize::new(0);
    progress.on_start(total);

    let analyze = |symbol: &String| {
        let result = analyze_symbol(provider, symbol, analysis, as_of);
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        progress.on_symbol(symbol, result.as_ref(), done, total);
        (symbol.clone(), result)
    };

    let results: Vec<(String, Result<AnalysisReport, RunError>)> = match batch.threads {
        Some(cap) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(cap)
                .build()
                .with_context(|| format!("failed to build a {cap}-thread pool"))?;
            pool.install(|| symbols.par_iter().map(analyze).collect())
        }
        None => symbols.par_iter().map(analyze).collect(),
    };

    let mut reports = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (symbol, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => failures.push(BatchFailure {
                symbol,
                error: e.to_string(),
            }),
        }
    }
    reports.sort_by(|a, b| b.score().cmp(&a.score()).then_with(|| a.symbol.cmp(&b.symbol)));
    failures.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let summary = BatchSummary {
        analysis_date: as_of,
        reports,
        failures,
        elapsed_secs: start.elapsed().as_secs_f64(),
    };
    progress.on_finish(&summary);
    Ok(summary)
}

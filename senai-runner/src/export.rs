//! Report export: JSON per symbol, one CSV line per symbol for the batch.
//!
//! Persisted reports carry a `schema_version`. Newer versions are rejected
//! on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::analysis::{AnalysisReport, SCHEMA_VERSION};
use crate::batch::BatchSummary;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisReport` to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize an `AnalysisReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per report, in the order given.
///
/// Columns: symbol, analysis_date, score, rating, signal, recommendation,
/// confidence, upside_probability, downside_risk, optimal_holding_days,
/// strategy_type, buy_zone_low, buy_zone_high, stop_loss, target1, target2,
/// target3
pub fn export_summary_csv(reports: &[AnalysisReport]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "symbol",
        "analysis_date",
        "score",
        "rating",
        "signal",
        "recommendation",
        "confidence",
        "upside_probability",
        "downside_risk",
        "optimal_holding_days",
        "strategy_type",
        "buy_zone_low",
        "buy_zone_high",
        "stop_loss",
        "target1",
        "target2",
        "target3",
    ])?;

    for r in reports {
        let d = &r.diagnosis;
        let s = &r.strategy;
        wtr.write_record([
            r.symbol.as_str(),
            &r.analysis_date.to_string(),
            &d.score.to_string(),
            &d.rating.to_string(),
            &i8::from(d.signal).to_string(),
            d.recommendation.label(),
            &d.confidence.to_string(),
            &format!("{:.0}", r.risk.upside_probability),
            &format!("{:.1}", r.risk.downside_risk),
            &r.risk.optimal_holding_days.to_string(),
            s.strategy_type.label(),
            &format!("{:.0}", s.buy_zone_low),
            &format!("{:.0}", s.buy_zone_high),
            &format!("{:.0}", s.stop_loss),
            &format!("{:.0}", s.target1),
            &format!("{:.0}", s.target2),
            &format!("{:.0}", s.target3),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Report bundle ──────────────────────────────────────────────────

/// Save a batch under `output_dir/{YYYYMMDD}/`:
/// - `{SYMBOL}.json` for every report
/// - `summary.csv` with the reports in score order
/// - `failures.json` when any symbol failed
///
/// Re-running on the same analysis date overwrites the previous files.
/// Returns the path to the dated directory.
pub fn save_reports(output_dir: &Path, summary: &BatchSummary) -> Result<PathBuf> {
    let run_dir = output_dir.join(summary.analysis_date.format("%Y%m%d").to_string());
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create report dir: {}", run_dir.display()))?;

    for report in &summary.reports {
        let path = run_dir.join(format!("{}.json", report.symbol));
        std::fs::write(&path, export_json(report)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let csv_path = run_dir.join("summary.csv");
    std::fs::write(&csv_path, export_summary_csv(&summary.reports)?)
        .with_context(|| format!("failed to write {}", csv_path.display()))?;

    if !summary.failures.is_empty() {
        let path = run_dir.join("failures.json");
        let json = serde_json::to_string_pretty(&summary.failures)
            .context("failed to serialize batch failures")?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(run_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_series;
    use crate::batch::BatchFailure;
    use crate::test_support::wave_series;
    use chrono::NaiveDate;
    use senai_core::config::AnalysisConfig;
    use senai_core::rng::FixedFallback;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn report(symbol: &str, n: usize) -> AnalysisReport {
        analyze_series(
            &wave_series(symbol, n),
            Default::default(),
            &AnalysisConfig::default(),
            day(),
            &FixedFallback(0.0),
        )
        .unwrap()
    }

    #[test]
    fn json_import_accepts_current_schema() {
        let r = report("FPT", 120);
        let back = import_json(&export_json(&r).unwrap()).unwrap();
        assert_eq!(back.symbol, "FPT");
        assert_eq!(back.diagnosis, r.diagnosis);
    }

    #[test]
    fn json_import_rejects_future_schema() {
        let mut r = report("FPT", 120);
        r.schema_version = SCHEMA_VERSION + 1;
        let err = import_json(&export_json(&r).unwrap()).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn summary_csv_has_header_and_one_row_per_report() {
        let reports = vec![report("FPT", 120), report("VNM", 90)];
        let csv = export_summary_csv(&reports).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("symbol,analysis_date,score,rating,signal"));
        assert!(lines[0].ends_with("target1,target2,target3"));
        assert!(lines[1].starts_with("FPT,2024-06-03,"));
        assert!(lines[2].starts_with("VNM,2024-06-03,"));
    }

    #[test]
    fn summary_csv_keeps_vietnamese_labels() {
        let r = report("FPT", 120);
        let csv = export_summary_csv(std::slice::from_ref(&r)).unwrap();
        assert!(csv.contains(r.diagnosis.recommendation.label()));
        assert!(csv.contains(r.strategy.strategy_type.label()));
    }

    #[test]
    fn save_reports_writes_dated_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let summary = BatchSummary {
            analysis_date: day(),
            reports: vec![report("FPT", 120), report("HPG", 100)],
            failures: vec![BatchFailure {
                symbol: "XYZ".into(),
                error: "symbol not found".into(),
            }],
            elapsed_secs: 0.1,
        };

        let run_dir = save_reports(dir.path(), &summary).unwrap();
        assert_eq!(run_dir, dir.path().join("20240603"));
        assert!(run_dir.join("FPT.json").exists());
        assert!(run_dir.join("HPG.json").exists());
        assert!(run_dir.join("summary.csv").exists());
        assert!(run_dir.join("failures.json").exists());

        let loaded = import_json(&std::fs::read_to_string(run_dir.join("FPT.json")).unwrap());
        assert_eq!(loaded.unwrap().symbol, "FPT");
    }

    #[test]
    fn no_failures_file_for_clean_batch() {
        let dir = tempfile::tempdir().unwrap();
        let summary = BatchSummary {
            analysis_date: day(),
            reports: vec![report("FPT", 120)],
            failures: vec![],
            elapsed_secs: 0.0,
        };
        let run_dir = save_reports(dir.path(), &summary).unwrap();
        assert!(!run_dir.join("failures.json").exists());
    }
}

//! SenAI CLI: analyze, indicators, peaks and batch commands.
//!
//! Commands:
//! - `analyze`: score one symbol (diagnosis, risk, strategy)
//! - `indicators`: print the tail of the indicator table from a CSV file
//! - `peaks`: list peaks and troughs at a lookback or chart zoom
//! - `batch`: score a universe in parallel and save the report bundle
//!
//! Price data comes from `--csv-dir` when given, otherwise from the REST
//! backend configured in `senai.toml` / `SENAI_BACKEND_URL` / `SENAI_API_KEY`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::prelude::*;

use senai_core::config::{SenaiConfig, DEFAULT_CONFIG_FILE};
use senai_core::data::{CsvProvider, DataProvider, RestBackend};
use senai_core::indicators::{find_peaks_troughs, lookback_for_zoom, IndicatorSet};
use senai_runner::{
    analyze_symbol, export_json, publish_all, run_batch, save_reports, AnalysisReport,
    RunnerConfig, TracingProgress,
};

#[derive(Parser)]
#[command(
    name = "senai",
    about = "SenAI: technical indicators and composite scoring for Vietnamese equities"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one symbol and print the diagnosis, risk and strategy.
    Analyze {
        /// Ticker, e.g. FPT.
        symbol: String,

        /// Read `{SYMBOL}.csv` from this directory instead of the backend.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Candles of history to request. Defaults to the config value (252).
        #[arg(long)]
        days: Option<usize>,

        /// Path to a TOML config file. Defaults to ./senai.toml when present.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Analysis date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Print the full report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the last rows of the indicator table.
    Indicators {
        symbol: String,

        #[arg(long)]
        csv_dir: PathBuf,

        /// Number of trailing rows to print.
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
    /// List peaks and troughs, sorted by candle index.
    Peaks {
        symbol: String,

        #[arg(long)]
        csv_dir: PathBuf,

        /// Candles on each side an extremum must dominate.
        #[arg(long, conflicts_with = "zoom")]
        lookback: Option<usize>,

        /// Chart zoom factor (1-15); derives the lookback.
        #[arg(long)]
        zoom: Option<f64>,
    },
    /// Score a whole universe and write the report bundle.
    Batch {
        /// Path to a TOML config file. Defaults to ./senai.toml when present.
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Overrides `[batch].output_dir`.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Upsert the results into the backend tables.
        #[arg(long, default_value_t = false)]
        publish: bool,

        /// Overrides `[batch].threads`.
        #[arg(long)]
        threads: Option<usize>,

        /// Analysis date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "senai=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            symbol,
            csv_dir,
            days,
            config,
            date,
            json,
        } => run_analyze(&symbol, csv_dir.as_deref(), days, config, date, json),
        Commands::Indicators {
            symbol,
            csv_dir,
            tail,
        } => run_indicators(&symbol, &csv_dir, tail),
        Commands::Peaks {
            symbol,
            csv_dir,
            lookback,
            zoom,
        } => run_peaks(&symbol, &csv_dir, lookback, zoom),
        Commands::Batch {
            config,
            csv_dir,
            output_dir,
            publish,
            threads,
            date,
        } => run_batch_cmd(config, csv_dir.as_deref(), output_dir, publish, threads, date),
    }
}

// ─── Shared setup ───────────────────────────────────────────────────

/// `--config` if given, else `./senai.toml` if it exists.
fn config_path(arg: Option<PathBuf>) -> Option<PathBuf> {
    arg.or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.exists().then_some(default)
    })
}

fn parse_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD")),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn open_backend(config: &SenaiConfig) -> Result<RestBackend> {
    RestBackend::new(config.backend.clone(), config.analysis.max_retries).context(
        "backend not configured: set SENAI_BACKEND_URL and SENAI_API_KEY, or pass --csv-dir",
    )
}

fn open_provider(csv_dir: Option<&Path>, config: &SenaiConfig) -> Result<Box<dyn DataProvider>> {
    match csv_dir {
        Some(dir) => {
            if !dir.is_dir() {
                bail!("CSV directory does not exist: {}", dir.display());
            }
            Ok(Box::new(CsvProvider::new(dir)))
        }
        None => Ok(Box::new(open_backend(config)?)),
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}

// ─── analyze ────────────────────────────────────────────────────────

fn run_analyze(
    symbol: &str,
    csv_dir: Option<&Path>,
    days: Option<usize>,
    config: Option<PathBuf>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let mut config = SenaiConfig::load(config_path(config).as_deref())?;
    if let Some(days) = days {
        config.analysis.history_days = days;
    }
    let as_of = parse_date(date.as_deref())?;
    let provider = open_provider(csv_dir, &config)?;

    let symbol = symbol.trim().to_ascii_uppercase();
    let report = analyze_symbol(provider.as_ref(), &symbol, &config.analysis, as_of)
        .with_context(|| format!("analysis of {symbol} failed"))?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(r: &AnalysisReport) {
    let d = &r.diagnosis;
    let risk = &r.risk;
    let s = &r.strategy;
    let t = &r.technical;

    println!();
    println!("=== {} ({}) ===", r.symbol, r.analysis_date);
    println!(
        "Last candle:     {} ({} candles)",
        r.last_candle_date, r.candle_count
    );
    println!("Price:           {:.0} ({:+.2}%)", t.current_price, t.price_change_pct);
    println!(
        "MA20/50/200:     {:.0} / {:.0} / {:.0}",
        t.ma20, t.ma50, t.ma200
    );
    println!("RSI(14):         {:.1}", t.rsi14);
    println!();
    println!("--- Diagnosis ---");
    println!("Score:           {}/100 (rating {}/5)", d.score, d.rating);
    println!("Recommendation:  {} (signal {})", d.recommendation, i8::from(d.signal));
    println!("Confidence:      {}%", d.confidence);
    println!(
        "Sub-scores:      technical {:+}, fundamental {:+}, momentum {:+}",
        d.breakdown.technical, d.breakdown.fundamental, d.breakdown.momentum
    );
    println!();
    println!("--- Risk ---");
    println!(
        "Holding:         {} days ({})",
        risk.optimal_holding_days,
        risk.holding_style.label()
    );
    println!("Upside prob.:    {:.0}%", risk.upside_probability);
    println!("Downside risk:   {:.1}%", risk.downside_risk);
    println!(
        "Volatility:      {:.1}% ({})",
        risk.volatility,
        risk.volatility_level.label()
    );
    println!("Beta:            {:.2}", risk.beta);
    println!("Sharpe:          {:.2}", risk.sharpe_ratio);
    println!("Max drawdown:    {:.1}%", risk.max_drawdown);
    println!();
    println!("--- Strategy: {} ---", s.strategy_type);
    println!("Buy zone:        {:.0} - {:.0}", s.buy_zone_low, s.buy_zone_high);
    println!("Stop loss:       {:.0}", s.stop_loss);
    println!(
        "Targets:         {:.0} / {:.0} / {:.0}",
        s.target1, s.target2, s.target3
    );
    println!(
        "Support:         {:.0} / {:.0}",
        r.levels.support1, r.levels.support2
    );
    println!(
        "Resistance:      {:.0} / {:.0}",
        r.levels.resistance1, r.levels.resistance2
    );
    println!("Note:            {}", s.strategy_note);
}

// ─── indicators ─────────────────────────────────────────────────────

fn run_indicators(symbol: &str, csv_dir: &Path, tail: usize) -> Result<()> {
    let provider = CsvProvider::new(csv_dir);
    let symbol = symbol.trim().to_ascii_uppercase();
    let series = provider
        .fetch_history(&symbol, usize::MAX)
        .with_context(|| format!("cannot read {symbol} from {}", csv_dir.display()))?;
    let candles = series.candles();
    let set = IndicatorSet::compute(candles);

    println!(
        "{:<10} {:>9} {:>9} {:>9} {:>7} {:>9} {:>9} {:>8} {:>8}",
        "Date", "Close", "MA20", "MA50", "RSI14", "BB up", "BB low", "MACD", "Signal"
    );
    println!("{}", "-".repeat(88));
    let start = candles.len().saturating_sub(tail);
    for row in (start..candles.len()).filter_map(|i| set.row(candles, i)) {
        println!(
            "{:<10} {:>9.0} {:>9} {:>9} {:>7} {:>9} {:>9} {:>8} {:>8}",
            row.date,
            row.close,
            fmt_opt(row.ma20, 0),
            fmt_opt(row.ma50, 0),
            fmt_opt(row.rsi14, 1),
            fmt_opt(row.bb_upper, 0),
            fmt_opt(row.bb_lower, 0),
            fmt_opt(row.macd, 1),
            fmt_opt(row.macd_signal, 1),
        );
    }
    Ok(())
}

// ─── peaks ──────────────────────────────────────────────────────────

fn run_peaks(
    symbol: &str,
    csv_dir: &Path,
    lookback: Option<usize>,
    zoom: Option<f64>,
) -> Result<()> {
    let lookback = match (lookback, zoom) {
        (Some(0), _) => bail!("--lookback must be at least 1"),
        (Some(l), _) => l,
        (None, Some(z)) => lookback_for_zoom(z),
        (None, None) => SenaiConfig::default().analysis.peak_lookback,
    };

    let provider = CsvProvider::new(csv_dir);
    let symbol = symbol.trim().to_ascii_uppercase();
    let series = provider
        .fetch_history(&symbol, usize::MAX)
        .with_context(|| format!("cannot read {symbol} from {}", csv_dir.display()))?;
    let extrema = find_peaks_troughs(series.candles(), lookback);

    println!("{symbol}: {} extrema at lookback {lookback}", extrema.len());
    println!("{:>6} {:<10} {:<7} {:>10}", "Index", "Date", "Kind", "Price");
    println!("{}", "-".repeat(36));
    for e in &extrema {
        println!(
            "{:>6} {:<10} {:<7} {:>10.0}",
            e.index,
            e.date,
            format!("{:?}", e.kind),
            e.price
        );
    }
    Ok(())
}

// ─── batch ──────────────────────────────────────────────────────────

fn run_batch_cmd(
    config: Option<PathBuf>,
    csv_dir: Option<&Path>,
    output_dir: Option<PathBuf>,
    publish: bool,
    threads: Option<usize>,
    date: Option<String>,
) -> Result<()> {
    let mut config = RunnerConfig::load(config_path(config).as_deref())?;
    if let Some(dir) = output_dir {
        config.batch.output_dir = dir;
    }
    if let Some(n) = threads {
        if n == 0 {
            bail!("--threads must be at least 1");
        }
        config.batch.threads = Some(n);
    }
    config.batch.publish |= publish;
    let as_of = parse_date(date.as_deref())?;

    // Fail on missing credentials before spending time on the batch.
    let sink = if config.batch.publish {
        Some(open_backend(&config.core)?)
    } else {
        None
    };
    let provider = open_provider(csv_dir, &config.core)?;

    info!(
        symbols = config.batch.universe.len(),
        provider = provider.name(),
        "starting batch"
    );
    let summary = run_batch(
        provider.as_ref(),
        &config.batch,
        &config.core.analysis,
        as_of,
        &TracingProgress,
    )?;

    println!();
    println!(
        "{:<6} {:>5} {:>6} {:<10} {:>7} {:<14}",
        "Symbol", "Score", "Rating", "Action", "Upside", "Strategy"
    );
    println!("{}", "-".repeat(53));
    for r in &summary.reports {
        println!(
            "{:<6} {:>5} {:>6} {:<10} {:>6.0}% {:<14}",
            r.symbol,
            r.diagnosis.score,
            r.diagnosis.rating,
            r.diagnosis.recommendation.label(),
            r.risk.upside_probability,
            r.strategy.strategy_type.label()
        );
    }
    for f in &summary.failures {
        eprintln!("Failed {}: {}", f.symbol, f.error);
    }

    let run_dir = save_reports(&config.batch.output_dir, &summary)?;
    println!("Reports saved to: {}", run_dir.display());

    if let Some(backend) = sink {
        let outcome = publish_all(&backend, &summary.reports);
        println!(
            "Published {} of {} report(s)",
            outcome.published,
            summary.reports.len()
        );
        if !outcome.failures.is_empty() {
            bail!("{} report(s) failed to publish", outcome.failures.len());
        }
    }

    if summary.reports.is_empty() {
        bail!("no symbol could be analyzed");
    }
    Ok(())
}

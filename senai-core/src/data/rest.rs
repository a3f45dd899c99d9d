//! Hosted backend client (PostgREST over HTTP).
//!
//! Reads daily prices from `stock_prices` and ratios from
//! `simplize_company_data`; writes go through `upsert` with
//! `Prefer: resolution=merge-duplicates` and an `on_conflict` target naming
//! the table's unique key (the primary key is a surrogate `id`). Handles
//! retries with exponential backoff and the circuit breaker. Every request
//! carries the configured key both as `apikey` and as a bearer token.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{assemble_series, DataError, DataProvider};
use crate::config::BackendConfig;
use crate::domain::{CandleSeries, FundamentalSnapshot, RawCandle};
use chrono::NaiveDate;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const PRICES_TABLE: &str = "stock_prices";
pub const FUNDAMENTALS_TABLE: &str = "simplize_company_data";

/// Unique key of every per-day result table.
pub const SYMBOL_DATE_KEY: &str = "symbol,analysis_date";

/// Delay before retry `attempt` (1-based): `base × 2^(attempt-1)`, saturating.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

/// One `stock_prices` row. Prices may be null for suspended sessions.
#[derive(Debug, Deserialize)]
struct PriceRow {
    trading_date: NaiveDate,
    open_price: Option<f64>,
    high_price: Option<f64>,
    low_price: Option<f64>,
    close_price: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

impl From<PriceRow> for RawCandle {
    fn from(row: PriceRow) -> Self {
        RawCandle {
            date: row.trading_date,
            open: row.open_price.unwrap_or(f64::NAN),
            high: row.high_price.unwrap_or(f64::NAN),
            low: row.low_price.unwrap_or(f64::NAN),
            close: row.close_price.unwrap_or(f64::NAN),
            volume: row.volume.map_or(0, |v| v.max(0.0).round() as u64),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FundamentalsRow {
    pe_ratio: Option<f64>,
    pb_ratio: Option<f64>,
    roe: Option<f64>,
    eps: Option<f64>,
    debt_to_equity: Option<f64>,
    revenue_growth: Option<f64>,
    profit_growth: Option<f64>,
}

impl From<FundamentalsRow> for FundamentalSnapshot {
    fn from(row: FundamentalsRow) -> Self {
        FundamentalSnapshot {
            pe: row.pe_ratio,
            pb: row.pb_ratio,
            roe: row.roe,
            eps: row.eps,
            debt_to_equity: row.debt_to_equity,
            revenue_growth: row.revenue_growth,
            profit_growth: row.profit_growth,
        }
    }
}

fn decode<T: DeserializeOwned>(table: &str, body: &str) -> Result<Vec<T>, DataError> {
    serde_json::from_str(body)
        .map_err(|e| DataError::ResponseFormatChanged(format!("{table}: {e}")))
}

/// Parse a newest-first `stock_prices` body into an ascending series.
pub fn parse_price_rows(symbol: &str, body: &str, days: usize) -> Result<CandleSeries, DataError> {
    let mut rows: Vec<PriceRow> = decode(PRICES_TABLE, body)?;
    if rows.is_empty() {
        return Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }
    rows.reverse();
    Ok(assemble_series(symbol, rows.into_iter().map(RawCandle::from), days))
}

/// Parse a `simplize_company_data` body. No row means no ratios.
pub fn parse_fundamentals(body: &str) -> Result<FundamentalSnapshot, DataError> {
    let rows: Vec<FundamentalsRow> = decode(FUNDAMENTALS_TABLE, body)?;
    Ok(rows.into_iter().next().map(Into::into).unwrap_or_default())
}

pub struct RestBackend {
    client: Client,
    config: BackendConfig,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl RestBackend {
    /// Fails when the endpoint or key is missing.
    pub fn new(config: BackendConfig, max_retries: u32) -> Result<Self, DataError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DataError::Other(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            circuit_breaker: Arc::new(CircuitBreaker::default_backend()),
            max_retries,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Share one breaker between several clients of the same backend.
    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    /// Send with retry and circuit breaker logic. `build` is called once per
    /// attempt since a request builder is consumed by `send`.
    fn send_with_retry(
        &self,
        what: &str,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<Response, DataError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.base_delay, attempt);
                warn!(what, attempt, delay_ms = delay.as_millis() as u64, "retrying request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            debug!(what, attempt, "sending request");
            match self.authorized(build()).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == StatusCode::FORBIDDEN {
                        self.circuit_breaker.trip();
                        return Err(DataError::CircuitBreakerTripped);
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        self.circuit_breaker.record_failure();
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == StatusCode::UNAUTHORIZED {
                        return Err(DataError::AuthenticationRequired(format!(
                            "backend rejected the API key for {what}"
                        )));
                    }

                    if status.is_client_error() {
                        return Err(DataError::ResponseFormatChanged(format!(
                            "HTTP {status} for {what}"
                        )));
                    }

                    if !status.is_success() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(DataError::Other(format!("HTTP {status} for {what}")));
                        continue;
                    }

                    self.circuit_breaker.record_success();
                    return Ok(resp);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }

    /// GET `table` with PostgREST filter pairs, returning the raw body.
    pub fn select_raw(&self, table: &str, query: &[(&str, String)]) -> Result<String, DataError> {
        let url = self.config.rest_url(table);
        let resp = self.send_with_retry(table, || self.client.get(&url).query(query))?;
        resp.text()
            .map_err(|e| DataError::ResponseFormatChanged(format!("{table}: {e}")))
    }

    pub fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, DataError> {
        let body = self.select_raw(table, query)?;
        decode(table, &body)
    }

    /// Insert-or-update `body` (one row or an array of rows) into `table`,
    /// merging on the comma-separated columns in `on_conflict`.
    pub fn upsert<T: Serialize + ?Sized>(
        &self,
        table: &str,
        on_conflict: &str,
        body: &T,
    ) -> Result<(), DataError> {
        let url = self.config.rest_url(table);
        let payload = serde_json::to_vec(body)
            .map_err(|e| DataError::Other(format!("cannot encode {table} row: {e}")))?;
        self.send_with_retry(table, || {
            self.client
                .post(&url)
                .query(&[("on_conflict", on_conflict)])
                .header("Content-Type", "application/json")
                .header("Prefer", "resolution=merge-duplicates")
                .body(payload.clone())
        })?;
        debug!(table, "upserted");
        Ok(())
    }
}

impl DataProvider for RestBackend {
    fn name(&self) -> &str {
        "rest_backend"
    }

    fn fetch_history(&self, symbol: &str, days: usize) -> Result<CandleSeries, DataError> {
        let body = self.select_raw(
            PRICES_TABLE,
            &[
                ("symbol", format!("eq.{symbol}")),
                ("order", "trading_date.desc".to_string()),
                ("limit", days.to_string()),
            ],
        )?;
        let series = parse_price_rows(symbol, &body, days)?;
        info!(symbol, candles = series.len(), "fetched history");
        Ok(series)
    }

    fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalSnapshot, DataError> {
        let body = self.select_raw(
            FUNDAMENTALS_TABLE,
            &[
                ("symbol", format!("eq.{symbol}")),
                ("limit", "1".to_string()),
            ],
        )?;
        let snapshot = parse_fundamentals(&body)?;
        if snapshot.is_empty() {
            debug!(symbol, "no reported fundamentals");
        }
        Ok(snapshot)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

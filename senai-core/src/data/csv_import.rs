//! Offline provider over a directory of CSV files.
//!
//! Layout:
//! ```text
//! data/
//!   FPT.csv                 date,open,high,low,close,volume
//!   FPT.fundamentals.toml   pe = 18.2 / roe = 27.5 / ...
//! ```
//! The fundamentals file is optional; without it the snapshot is empty.

use super::provider::{assemble_series, DataError, DataProvider};
use crate::domain::{CandleSeries, FundamentalSnapshot, RawCandle};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn history_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    pub fn fundamentals_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.fundamentals.toml"))
    }

    /// Write a series in the layout `fetch_history` reads.
    pub fn write_series(&self, series: &CandleSeries) -> Result<PathBuf, DataError> {
        let path = self.history_path(series.symbol());
        let csv_err = |source| DataError::Csv {
            path: path.clone(),
            source,
        };
        let mut writer = ::csv::Writer::from_path(&path).map_err(csv_err)?;
        for candle in series.candles() {
            writer.serialize(RawCandle::from(*candle)).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| DataError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_history(&self, symbol: &str, days: usize) -> Result<CandleSeries, DataError> {
        let path = self.history_path(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let csv_err = |source| DataError::Csv {
            path: path.clone(),
            source,
        };

        let mut reader = ::csv::ReaderBuilder::new()
            .trim(::csv::Trim::All)
            .from_path(&path)
            .map_err(csv_err)?;
        let rows = reader
            .deserialize::<RawCandle>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_err)?;

        debug!(symbol, rows = rows.len(), path = %path.display(), "read CSV history");
        Ok(assemble_series(symbol, rows, days))
    }

    fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalSnapshot, DataError> {
        let path = self.fundamentals_path(symbol);
        if !path.exists() {
            return Ok(FundamentalSnapshot::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|source| DataError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| DataError::Fundamentals {
            path,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_symbol_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        assert!(matches!(
            provider.fetch_history("AAA", 10),
            Err(DataError::SymbolNotFound { .. })
        ));
        assert!(provider.fetch_fundamentals("AAA").unwrap().is_empty());
    }

    #[test]
    fn reads_and_trims_history() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("HPG.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-03, 27000, 27500, 26800, 27300, 1500000\n\
             2024-01-02, 26500, 27100, 26400, 27000, 1200000\n\
             2024-01-04, 27300, 27400, 26900, 27100, 900000\n",
        )
        .unwrap();
        let provider = CsvProvider::new(dir.path());
        let series = provider.fetch_history("HPG", 2).unwrap();
        assert_eq!(series.closes(), vec![27_300.0, 27_100.0]);
    }

    #[test]
    fn malformed_row_is_a_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("MWG.csv"),
            "date,open,high,low,close,volume\n2024-01-02,abc,1,1,1,1\n",
        )
        .unwrap();
        let provider = CsvProvider::new(dir.path());
        assert!(matches!(
            provider.fetch_history("MWG", 10),
            Err(DataError::Csv { .. })
        ));
    }

    #[test]
    fn fundamentals_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("VCB.fundamentals.toml"),
            "pe = 14.5\nroe = 21.0\n",
        )
        .unwrap();
        let provider = CsvProvider::new(dir.path());
        let f = provider.fetch_fundamentals("VCB").unwrap();
        assert_eq!(f.pe, Some(14.5));
        assert_eq!(f.roe, Some(21.0));
        assert_eq!(f.pb, None);

        std::fs::write(dir.path().join("VCB.fundamentals.toml"), "pe = \"high\"\n").unwrap();
        assert!(matches!(
            provider.fetch_fundamentals("VCB"),
            Err(DataError::Fundamentals { .. })
        ));
    }
}

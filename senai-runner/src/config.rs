//! Batch configuration: the `[batch]` table of `senai.toml`, layered on top
//! of the core `[backend]` / `[analysis]` tables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use senai_core::config::{ConfigError, SenaiConfig};

use crate::universe::vn30;

/// Default directory for saved reports.
pub const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Universe-wide run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Symbols to analyze. Defaults to the VN30 basket.
    pub universe: Vec<String>,

    /// Where `save_reports` writes its files.
    pub output_dir: PathBuf,

    /// Push results to the backend after the run.
    pub publish: bool,

    /// Worker cap for the rayon pool. `None` uses rayon's default.
    pub threads: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            universe: vn30(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            publish: false,
            threads: None,
        }
    }
}

impl BatchConfig {
    /// Upper-case, de-duplicate and check the universe; reject a zero thread cap.
    pub fn normalized(mut self) -> Result<Self, ConfigError> {
        let mut seen = std::collections::HashSet::new();
        self.universe = self
            .universe
            .iter()
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();
        if self.universe.is_empty() {
            return Err(ConfigError::Invalid {
                field: "batch.universe",
                reason: "no symbols left after normalization".into(),
            });
        }
        if self.threads == Some(0) {
            return Err(ConfigError::Invalid {
                field: "batch.threads",
                reason: "must be at least 1".into(),
            });
        }
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
struct BatchTable {
    #[serde(default)]
    batch: BatchConfig,
}

/// Everything a batch run needs: core settings plus `[batch]`.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    pub core: SenaiConfig,
    pub batch: BatchConfig,
}

impl RunnerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let core = SenaiConfig::from_toml_str(text)?;
        let table: BatchTable = toml::from_str(text)?;
        Ok(Self {
            core,
            batch: table.batch.normalized()?,
        })
    }

    /// Defaults, then `path` (if given), then the environment for the
    /// backend credentials.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let core = SenaiConfig::load(path)?;
        let batch = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                let table: BatchTable = toml::from_str(&text)?;
                table.batch
            }
            None => BatchConfig::default(),
        };
        Ok(Self {
            core,
            batch: batch.normalized()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_universe_is_vn30() {
        let c = BatchConfig::default();
        assert_eq!(c.universe.len(), 30);
        assert_eq!(c.output_dir, PathBuf::from("reports"));
        assert!(!c.publish);
        assert_eq!(c.threads, None);
    }

    #[test]
    fn batch_table_parses_alongside_core_tables() {
        let c = RunnerConfig::from_toml_str(
            r#"
            [analysis]
            history_days = 120

            [batch]
            universe = ["fpt", " vnm ", "FPT"]
            output_dir = "out"
            publish = true
            threads = 4
            "#,
        )
        .unwrap();
        assert_eq!(c.core.analysis.history_days, 120);
        assert_eq!(c.batch.universe, vec!["FPT", "VNM"]);
        assert_eq!(c.batch.output_dir, PathBuf::from("out"));
        assert!(c.batch.publish);
        assert_eq!(c.batch.threads, Some(4));
    }

    #[test]
    fn missing_batch_table_uses_defaults() {
        let c = RunnerConfig::from_toml_str("[analysis]\npeak_lookback = 10\n").unwrap();
        assert_eq!(c.batch, BatchConfig::default());
    }

    #[test]
    fn empty_universe_rejected() {
        let err = RunnerConfig::from_toml_str("[batch]\nuniverse = [\"  \"]\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "batch.universe",
                ..
            }
        ));
    }

    #[test]
    fn zero_threads_rejected() {
        let err = RunnerConfig::from_toml_str("[batch]\nthreads = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "batch.threads",
                ..
            }
        ));
    }

    #[test]
    fn load_reads_batch_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("senai.toml");
        std::fs::write(&path, "[batch]\nuniverse = [\"HPG\"]\n").unwrap();
        let c = RunnerConfig::load(Some(&path)).unwrap();
        assert_eq!(c.batch.universe, vec!["HPG"]);
    }

    proptest! {
        #[test]
        fn normalized_universe_is_upper_and_unique(
            symbols in prop::collection::vec("[a-zA-Z]{3} ?", 1..40)
        ) {
            let c = BatchConfig { universe: symbols.clone(), ..Default::default() }
                .normalized()
                .unwrap();
            let mut seen = std::collections::HashSet::new();
            for s in &c.universe {
                prop_assert_eq!(s, &s.to_ascii_uppercase());
                prop_assert_eq!(s.trim(), s.as_str());
                prop_assert!(seen.insert(s.clone()), "duplicate {}", s);
            }
            // first occurrence order is kept
            let first = symbols[0].trim().to_ascii_uppercase();
            prop_assert_eq!(&c.universe[0], &first);
        }
    }
}

//! Configuration: backend credentials and analysis parameters.
//!
//! Precedence, lowest to highest: built-in defaults, the TOML file
//! (`[backend]` and `[analysis]` tables), then `SENAI_BACKEND_URL` /
//! `SENAI_API_KEY` from the environment (a `.env` file is read first).
//! Credentials are never compiled in.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const BACKEND_URL_ENV: &str = "SENAI_BACKEND_URL";
pub const API_KEY_ENV: &str = "SENAI_API_KEY";
pub const DEFAULT_CONFIG_FILE: &str = "senai.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing backend setting `{0}` (set it in [backend] or the environment)")]
    Missing(&'static str),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Connection settings for the hosted data backend.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub data_backend_endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            data_backend_endpoint: String::new(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

// The key must not leak into logs.
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("data_backend_endpoint", &self.data_backend_endpoint)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl BackendConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            data_backend_endpoint: endpoint.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Both endpoint and key are required before any request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_backend_endpoint.trim().is_empty() {
            return Err(ConfigError::Missing("data_backend_endpoint"));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("api_key"));
        }
        if !self.data_backend_endpoint.starts_with("http://")
            && !self.data_backend_endpoint.starts_with("https://")
        {
            return Err(ConfigError::Invalid {
                field: "data_backend_endpoint",
                reason: format!("expected an http(s) URL, got {}", self.data_backend_endpoint),
            });
        }
        Ok(())
    }

    /// `{endpoint}/rest/v1/{table}`.
    pub fn rest_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.data_backend_endpoint.trim_end_matches('/'),
            table
        )
    }

    fn apply_env(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.is_empty()) {
            debug!(var = BACKEND_URL_ENV, "backend endpoint taken from environment");
            self.data_backend_endpoint = url;
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            debug!(var = API_KEY_ENV, "API key taken from environment");
            self.api_key = key;
        }
    }
}

/// Upper bound on `AnalysisConfig::max_retries`.
pub const MAX_RETRIES: u32 = 10;

/// Parameters of a single-symbol analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Candles requested from the provider.
    pub history_days: usize,
    pub peak_lookback: usize,
    pub bollinger_std_dev: f64,
    /// HTTP retries per request, at most `MAX_RETRIES`.
    pub max_retries: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            history_days: 252,
            peak_lookback: 20,
            bollinger_std_dev: 2.0,
            max_retries: 3,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_days == 0 {
            return Err(ConfigError::Invalid {
                field: "history_days",
                reason: "must be positive".into(),
            });
        }
        if !self.bollinger_std_dev.is_finite() || self.bollinger_std_dev < 0.0 {
            return Err(ConfigError::Invalid {
                field: "bollinger_std_dev",
                reason: format!("must be a non-negative number, got {}", self.bollinger_std_dev),
            });
        }
        if self.max_retries > MAX_RETRIES {
            return Err(ConfigError::Invalid {
                field: "max_retries",
                reason: format!("at most {MAX_RETRIES}, got {}", self.max_retries),
            });
        }
        Ok(())
    }
}

/// The `[backend]` and `[analysis]` tables of `senai.toml`. Other tables are
/// ignored here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenaiConfig {
    pub backend: BackendConfig,
    pub analysis: AnalysisConfig,
}

impl SenaiConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SenaiConfig = toml::from_str(text)?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// Load defaults, then `path` (if given), then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load_with_env(path, &|name| std::env::var(name).ok())
    }

    /// As `load`, with an explicit environment lookup.
    pub fn load_with_env(
        path: Option<&Path>,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                debug!(path = %path.display(), "loaded config file");
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.backend.apply_env(lookup);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults() {
        let c = SenaiConfig::default();
        assert_eq!(c.analysis.history_days, 252);
        assert_eq!(c.analysis.peak_lookback, 20);
        assert_eq!(c.analysis.max_retries, 3);
        assert!(c.backend.validate().is_err());
    }

    #[test]
    fn toml_overrides_defaults() {
        let c = SenaiConfig::from_toml_str(
            r#"
            [backend]
            data_backend_endpoint = "https://example.supabase.co"
            api_key = "file-key"

            [analysis]
            history_days = 400

            [batch]
            universe = ["FPT"]
            "#,
        )
        .unwrap();
        assert_eq!(c.analysis.history_days, 400);
        assert_eq!(c.analysis.bollinger_std_dev, 2.0);
        assert!(c.backend.validate().is_ok());
        assert_eq!(
            c.backend.rest_url("stock_prices"),
            "https://example.supabase.co/rest/v1/stock_prices"
        );
    }

    #[test]
    fn env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[backend]\ndata_backend_endpoint = \"https://file.example\"\napi_key = \"file-key\""
        )
        .unwrap();

        let env = |name: &str| match name {
            API_KEY_ENV => Some("env-key".to_string()),
            _ => None,
        };
        let c = SenaiConfig::load_with_env(Some(file.path()), &env).unwrap();
        assert_eq!(c.backend.api_key, "env-key");
        assert_eq!(c.backend.data_backend_endpoint, "https://file.example");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = SenaiConfig::load_with_env(Some(Path::new("/nonexistent/senai.toml")), &no_env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            SenaiConfig::from_toml_str("[analysis]\nhistory_days = 0\n"),
            Err(ConfigError::Invalid { field: "history_days", .. })
        ));
        assert!(matches!(
            SenaiConfig::from_toml_str("[analysis\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SenaiConfig::from_toml_str("[analysis]\nmax_retries = 40\n"),
            Err(ConfigError::Invalid { field: "max_retries", .. })
        ));
        assert!(SenaiConfig::from_toml_str("[analysis]\nmax_retries = 10\n").is_ok());
        let bad_url = BackendConfig::new("ftp://x", "k");
        assert!(matches!(bad_url.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn debug_redacts_key() {
        let c = BackendConfig::new("https://x.example", "super-secret");
        let shown = format!("{c:?}");
        assert!(!shown.contains("super-secret"));
        assert!(shown.contains("<redacted>"));
    }
}

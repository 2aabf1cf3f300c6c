//! Dashboard configuration, loaded once at startup from TOML.
//!
//! ```toml
//! min_date = "2017-01-01"
//! default_selection = ["SPY", "IVV", "VOO", "VTI", "QQQ"]
//!
//! [[tickers]]
//! key = "spy"
//! symbol = "SPY"
//!
//! [provider]
//! kind = "yahoo"
//! timeout_secs = 30
//!
//! [fetch]
//! mode = "parallel"
//! max_workers = 4
//! cache_capacity = 64
//! ```
//!
//! Every section is optional; omitted fields take the reference defaults.

use crate::data::aggregate::FetchMode;
use crate::data::cache::DEFAULT_CAPACITY;
use crate::data::catalog::{CatalogEntry, TickerCatalog};
use crate::data::yahoo::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Which price source to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Directory of `{SYMBOL}.csv` files, required when `kind = "csv"`.
    pub csv_dir: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            csv_dir: None,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchModeName {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub mode: FetchModeName,
    pub max_workers: usize,
    pub cache_capacity: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: FetchModeName::Sequential,
            max_workers: 4,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl FetchConfig {
    pub fn fetch_mode(&self) -> FetchMode {
        match self.mode {
            FetchModeName::Sequential => FetchMode::Sequential,
            FetchModeName::Parallel => FetchMode::Parallel {
                max_workers: self.max_workers,
            },
        }
    }
}

/// Static, process-wide dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Earliest selectable date; the default start of a request.
    pub min_date: NaiveDate,
    /// Names preselected when the user has not chosen any.
    pub default_selection: Vec<String>,
    pub tickers: Vec<CatalogEntry>,
    pub provider: ProviderConfig,
    pub fetch: FetchConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            min_date: reference_min_date(),
            default_selection: ["SPY", "IVV", "VOO", "VTI", "QQQ"]
                .into_iter()
                .map(String::from)
                .collect(),
            tickers: TickerCatalog::reference().entries().to_vec(),
            provider: ProviderConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

fn reference_min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or(NaiveDate::MIN)
}

impl DashboardConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.catalog().check().map_err(ConfigError::Invalid)?;
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be > 0".into()));
        }
        if self.provider.kind == ProviderKind::Csv && self.provider.csv_dir.is_none() {
            return Err(ConfigError::Invalid(
                "provider.csv_dir is required when provider.kind = \"csv\"".into(),
            ));
        }
        if self.fetch.max_workers == 0 {
            return Err(ConfigError::Invalid("fetch.max_workers must be > 0".into()));
        }
        if self.fetch.cache_capacity == 0 {
            return Err(ConfigError::Invalid("fetch.cache_capacity must be > 0".into()));
        }
        Ok(())
    }

    pub fn catalog(&self) -> TickerCatalog {
        TickerCatalog::new(self.tickers.clone())
    }

    /// Serialize the config to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(format!("serialize: {e}")))
    }
}

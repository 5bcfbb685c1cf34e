//! Run configuration.
//!
//! Built once at startup (defaults, then an optional TOML file, then CLI
//! overrides) and passed by reference into the pipeline.

use heatlab_core::data::cafef::DEFAULT_BASE_URL;
use heatlab_core::domain::HistoryRange;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::document::SizeMode;

pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("workers must be at least 1")]
    InvalidWorkers,

    #[error("timeout_secs must be at least 1")]
    InvalidTimeout,
}

/// Everything a heatmap run needs to know, resolved up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Requested history window.
    pub range: HistoryRange,

    /// Fetch pool width.
    pub workers: usize,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// History endpoint host.
    pub base_url: String,

    /// One ticker per line.
    pub symbols_file: PathBuf,

    /// Optional symbol → sector/name table.
    pub sectors_file: PathBuf,

    /// Optional symbol → market cap table.
    pub market_caps_file: PathBuf,

    /// Where artifacts are written.
    pub output_dir: PathBuf,

    /// Chart block sizing.
    pub size_mode: SizeMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            range: HistoryRange::default(),
            workers: DEFAULT_WORKERS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_string(),
            symbols_file: PathBuf::from("symbols.txt"),
            sectors_file: PathBuf::from("sectors.csv"),
            market_caps_file: PathBuf::from("marketcaps.csv"),
            output_dir: PathBuf::from("."),
            size_mode: SizeMode::default(),
        }
    }
}

impl RunConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

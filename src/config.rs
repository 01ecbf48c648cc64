use crate::types::Symbol;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Aggregator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Venue the tracked books belong to
    pub exchange: String,
    /// Symbols to track
    pub symbols: Vec<Symbol>,
    /// Log level filter ("error" .. "trace")
    pub log_level: String,
    /// Optional log file, in addition to stdout
    pub log_file: Option<PathBuf>,
    /// Pending commands per book worker before senders wait
    pub command_capacity: usize,
    /// Emitted deltas buffered per subscriber before it lags
    pub delta_capacity: usize,
    /// Levels per side shown in top-of-book summaries
    pub summary_depth: usize,
    /// Input and output files for the file replay binary
    pub replay: ReplayConfig,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            exchange: "binance".to_string(),
            symbols: vec![Symbol::new("BTC_USDT")],
            log_level: "info".to_string(),
            log_file: None,
            command_capacity: 1024,
            delta_capacity: 4096,
            summary_depth: 5,
            replay: ReplayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub snapshot_file: PathBuf,
    pub update_file: PathBuf,
    pub snapshot_output: PathBuf,
    pub update_output: PathBuf,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            snapshot_file: PathBuf::from("./snapshot.json"),
            update_file: PathBuf::from("./update.json"),
            snapshot_output: PathBuf::from("./snapshot1.json"),
            update_output: PathBuf::from("./snapshot2.json"),
        }
    }
}

impl AggregatorConfig {
    /// Load and validate a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw)?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exchange.trim().is_empty() {
            return Err(ConfigError::Invalid("exchange must not be empty".to_string()));
        }
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("at least one symbol is required".to_string()));
        }
        if let Some(symbol) = self.symbols.iter().find(|s| !s.is_valid()) {
            return Err(ConfigError::Invalid(format!("invalid symbol {:?}", symbol.as_str())));
        }
        if self.command_capacity == 0 || self.delta_capacity == 0 {
            return Err(ConfigError::Invalid("channel capacities must be non-zero".to_string()));
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!("unknown log level {:?}", self.log_level)));
        }
        Ok(())
    }
}

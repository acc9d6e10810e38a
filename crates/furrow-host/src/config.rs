//! Host configuration.
//!
//! [`HostConfig`] has defaults for every field. [`HostConfig::load`] layers
//! an optional TOML file and `FURROW_*` environment variables on top of them;
//! command-line flags are applied last by the binary.
//!
//! Protocol parameters (weight table, emission schedule) are compile-time
//! constants, not configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `FURROW_DATA_DIR`.
pub const ENV_PREFIX: &str = "FURROW";

/// Configuration for a contract host instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Root directory for all persistent data.
    pub data_dir: PathBuf,
    /// Log level filter string (e.g. "info", "debug", "furrow_host=trace").
    pub log_level: String,
    /// Log output format ("text" or "json").
    pub log_format: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("furrow");

        Self {
            data_dir,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl HostConfig {
    /// Load defaults, then `file` if given and present, then the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let defaults = ::config::Config::try_from(&Self::default())?;
        let mut builder = ::config::Config::builder().add_source(defaults);
        if let Some(path) = file {
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    /// Path to the RocksDB contract data directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("contractdata")
    }
}

//! User configuration.
//!
//! Loaded from `config.toml` in the platform config directory
//! (`~/.config/pocket/config.toml` on Linux) unless a path is given.
//!
//! ```toml
//! data_dir = "/home/me/.local/share/pocket"
//! error_display_ms = 2000
//!
//! [log]
//! enabled = true
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const APP_DIR: &str = "pocket";
const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the configured data directory.
pub const DATA_DIR_ENV: &str = "POCKET_DATA_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Write a log file into the data directory
    pub enabled: bool,
    /// `tracing_subscriber::EnvFilter` directive
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where history, tasks and the log file live
    pub data_dir: Option<PathBuf>,
    /// How long a calculator error stays on screen before resetting
    pub error_display_ms: u64,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            error_display_ms: 2000,
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Reads a config file. A missing file yields the defaults when
    /// `required` is false.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies the environment override for the data directory.
    pub fn apply_env(&mut self, data_dir: Option<String>) {
        if let Some(dir) = data_dir.filter(|dir| !dir.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// The configured data directory, falling back to the platform data
    /// directory and finally the working directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.resolved_data_dir().join("pocket.log")
    }
}

//! Runtime settings
//!
//! Loaded from an optional TOML file, then overridden by `TSQUERY_`-prefixed
//! environment variables (`TSQUERY_EXECUTOR__FETCH_SIZE=500`).

use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TSQUERY_";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] figment::Error),
}

/// Database connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

/// Server-side cursor behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Rows pulled from the cursor per round trip
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
    /// Abort statements running longer than this
    #[serde(default)]
    pub statement_timeout_ms: Option<u64>,
}

fn default_fetch_size() -> usize {
    1000
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            fetch_size: default_fetch_size(),
            statement_timeout_ms: None,
        }
    }
}

impl ExecutorConfig {
    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines instead of plain text
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Settings {
    /// Defaults, then `path` if it exists, then the environment
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        Self::figment(Figment::new().merge(Toml::file(path.as_ref())))
    }

    /// Defaults, then the environment
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::figment(Figment::new())
    }

    fn figment(sources: Figment) -> Result<Self, SettingsError> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(sources)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(settings)
    }
}

//! Client configuration with TOML file support.
//!
//! Precedence: CLI flags and `AGORA_*` environment variables, then the
//! config file, then built-in defaults.

use std::path::Path;
use std::time::Duration;

use agora_governance::PipelineOptions;
use agora_rpc::RpcLedgerOptions;
use agora_types::Address;
use agora_utils::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Governor of the local demo deployment.
pub const DEFAULT_GOVERNOR: &str = "0x59b670e9fA9D0A427751Af201D676719a970857b";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON-RPC endpoint of the chain the governor lives on.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    #[serde(default = "default_governor")]
    pub governor_address: Address,

    /// Upper bound on per-proposal fetches in flight during a pass.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Block polling interval for `watch`.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter, e.g. "info" or "debug,agora_rpc=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_governor() -> Address {
    DEFAULT_GOVERNOR.parse().unwrap_or(Address::ZERO)
}

fn default_max_concurrent_fetches() -> usize {
    16
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through the environment.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub rpc_url: Option<String>,
    pub governor_address: Option<Address>,
    pub max_concurrent_fetches: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub log_format: Option<LogFormat>,
    pub log_level: Option<String>,
}

impl ClientConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn apply(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(url) = overrides.rpc_url {
            self.rpc_url = url;
        }
        if let Some(governor) = overrides.governor_address {
            self.governor_address = governor;
        }
        if let Some(n) = overrides.max_concurrent_fetches {
            self.max_concurrent_fetches = n;
        }
        if let Some(secs) = overrides.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
        if let Some(ms) = overrides.poll_interval_ms {
            self.poll_interval_ms = ms;
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_fetches == 0 {
            return Err(ConfigError::Invalid("max_concurrent_fetches must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be at least 1".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be at least 1".into()));
        }
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "rpc_url must be an http(s) URL, got {:?}",
                self.rpc_url
            )));
        }
        Ok(())
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            max_concurrent_fetches: self.max_concurrent_fetches,
        }
    }

    pub fn rpc_options(&self) -> RpcLedgerOptions {
        RpcLedgerOptions {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            governor_address: default_governor(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

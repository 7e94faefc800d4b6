//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::load_balancer::mode::BalanceMode;

/// Address used when a backend leaves `address` empty.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:6379";

/// Probe interval used when a backend leaves `check_interval_ms` unset.
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 1_000;

/// Shortest accepted probe interval.
pub const MIN_CHECK_INTERVAL_MS: u64 = 100;

/// Root configuration for a balancer pool.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Selection strategy applied by `Pool::next`.
    pub mode: BalanceMode,

    /// Backend definitions, in selection order.
    pub backends: Vec<BackendConfig>,

    /// Dial and read deadline for the status transport, in milliseconds.
    pub dial_timeout_ms: u64,

    /// Metrics exporter settings.
    pub metrics: MetricsConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            mode: BalanceMode::default(),
            backends: Vec::new(),
            dial_timeout_ms: 5_000,
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Transport family of a backend address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Network {
    #[default]
    Tcp,
    Unix,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Unix => "unix",
        }
    }
}

/// Anything other than `unix` means TCP.
impl From<String> for Network {
    fn from(value: String) -> Self {
        if value == "unix" {
            Network::Unix
        } else {
            Network::Tcp
        }
    }
}

impl From<Network> for String {
    fn from(value: Network) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-backend options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BackendConfig {
    /// TCP `host:port` or unix socket path. Empty means [`DEFAULT_ADDRESS`].
    pub address: String,

    /// `tcp` or `unix`.
    pub network: Network,

    /// Probe interval in milliseconds. Zero means [`DEFAULT_CHECK_INTERVAL_MS`].
    pub check_interval_ms: u64,

    /// Consecutive successful probes required to mark the backend up.
    pub rise: u32,

    /// Consecutive failed probes required to mark the backend down.
    pub fall: u32,
}

impl BackendConfig {
    /// Convenience constructor for a TCP backend with default tuning.
    pub fn tcp(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Convenience constructor for a unix socket backend with default tuning.
    pub fn unix(path: impl Into<String>) -> Self {
        Self {
            address: path.into(),
            network: Network::Unix,
            ..Self::default()
        }
    }
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Serve a Prometheus scrape endpoint.
    pub enabled: bool,

    /// Bind address of the scrape endpoint.
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,

    /// `text` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "store_balancer=info".to_string(),
            format: "text".to_string(),
        }
    }
}

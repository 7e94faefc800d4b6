//! Error types for the balancer.
//!
//! Probe failures never reach callers of [`Pool::next`](crate::load_balancer::pool::Pool::next);
//! they only feed the health counters. The errors here surface from shutdown,
//! dialing and configuration loading.

use std::time::Duration;
use thiserror::Error;

/// A single failed status exchange with a backend.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("status reply has no connected_clients field")]
    MissingMetric,
}

/// Errors reported by the pool.
#[derive(Debug, Error)]
pub enum BalancerError {
    #[error("transport error: {0}")]
    Transport(#[from] ProbeError),

    #[error("monitor task failed: {0}")]
    Task(String),

    #[error("failed to dial {address}: {source}")]
    Dial {
        address: String,
        #[source]
        source: ProbeError,
    },
}

/// Errors raised while loading configuration from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

//! Selection strategy enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strategy used by [`Pool::next`](super::pool::Pool::next).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceMode {
    /// Up backend with the fewest advisory connections.
    #[default]
    #[serde(alias = "LeastConnections", alias = "least_conn")]
    LeastConnections,
    /// First up backend in configuration order.
    #[serde(alias = "FirstUp")]
    FirstUp,
    /// Up backend with the lowest probe latency.
    #[serde(alias = "MinLatency")]
    MinLatency,
    /// Uniformly random up backend.
    #[serde(alias = "Random")]
    Random,
    /// Random up backend, favouring low latency (weight = latency²).
    #[serde(alias = "WeightedLatency")]
    WeightedLatency,
    /// Rotate over the up backends.
    #[serde(alias = "RoundRobin")]
    RoundRobin,
}

impl BalanceMode {
    pub const ALL: [BalanceMode; 6] = [
        BalanceMode::LeastConnections,
        BalanceMode::FirstUp,
        BalanceMode::MinLatency,
        BalanceMode::Random,
        BalanceMode::WeightedLatency,
        BalanceMode::RoundRobin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceMode::LeastConnections => "least_connections",
            BalanceMode::FirstUp => "first_up",
            BalanceMode::MinLatency => "min_latency",
            BalanceMode::Random => "random",
            BalanceMode::WeightedLatency => "weighted_latency",
            BalanceMode::RoundRobin => "round_robin",
        }
    }
}

impl fmt::Display for BalanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BalanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.replace(['-', '_'], "").to_ascii_lowercase();
        match key.as_str() {
            "leastconnections" | "leastconn" => Ok(BalanceMode::LeastConnections),
            "firstup" => Ok(BalanceMode::FirstUp),
            "minlatency" => Ok(BalanceMode::MinLatency),
            "random" => Ok(BalanceMode::Random),
            "weightedlatency" => Ok(BalanceMode::WeightedLatency),
            "roundrobin" => Ok(BalanceMode::RoundRobin),
            _ => Err(format!("unknown balance mode: {}", s)),
        }
    }
}

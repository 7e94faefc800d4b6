//! Backend option normalization.
//!
//! Applied once at pool construction. Inputs are never mutated; a normalized
//! copy is returned.

use std::time::Duration;

use crate::config::schema::{
    BackendConfig, BalancerConfig, DEFAULT_ADDRESS, DEFAULT_CHECK_INTERVAL_MS,
    MIN_CHECK_INTERVAL_MS,
};

/// Fill in defaults and clamp out-of-range values.
///
/// - empty address becomes [`DEFAULT_ADDRESS`]
/// - an unset (zero) interval becomes one second, anything below 100ms is raised to 100ms
/// - rise and fall below one become one
pub fn normalize(config: &BackendConfig) -> BackendConfig {
    let mut clone = config.clone();

    if clone.address.is_empty() {
        clone.address = DEFAULT_ADDRESS.to_string();
    }
    if clone.check_interval_ms == 0 {
        clone.check_interval_ms = DEFAULT_CHECK_INTERVAL_MS;
    } else if clone.check_interval_ms < MIN_CHECK_INTERVAL_MS {
        clone.check_interval_ms = MIN_CHECK_INTERVAL_MS;
    }
    clone.rise = clone.rise.max(1);
    clone.fall = clone.fall.max(1);
    clone
}

impl BackendConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }
}

impl BalancerConfig {
    /// Normalized backend list. An empty list yields one default backend so a
    /// pool is always usable without configuration.
    pub fn normalized_backends(&self) -> Vec<BackendConfig> {
        if self.backends.is_empty() {
            return vec![normalize(&BackendConfig::default())];
        }
        self.backends.iter().map(normalize).collect()
    }

    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms.max(1))
    }
}

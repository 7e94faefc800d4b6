//! Remaining selection strategies and the mode → strategy mapping.

use std::sync::Arc;

use crate::load_balancer::{
    backend::Backend, least_conn::LeastConnections, mode::BalanceMode, round_robin::RoundRobin,
    selection::Backends, LoadBalancer,
};

/// Build the strategy for `mode`.
pub fn for_mode(mode: BalanceMode) -> Box<dyn LoadBalancer> {
    match mode {
        BalanceMode::LeastConnections => Box::new(LeastConnections::new()),
        BalanceMode::FirstUp => Box::new(FirstUp),
        BalanceMode::MinLatency => Box::new(MinLatency),
        BalanceMode::Random => Box::new(UniformRandom),
        BalanceMode::WeightedLatency => Box::new(WeightedLatency),
        BalanceMode::RoundRobin => Box::new(RoundRobin::new()),
    }
}

/// First up backend in configuration order.
#[derive(Debug, Default)]
pub struct FirstUp;

impl LoadBalancer for FirstUp {
    fn next_server(&self, backends: &Backends) -> Option<Arc<Backend>> {
        backends.first_up().cloned()
    }
}

/// Up backend with the lowest last-probe latency.
#[derive(Debug, Default)]
pub struct MinLatency;

impl LoadBalancer for MinLatency {
    fn next_server(&self, backends: &Backends) -> Option<Arc<Backend>> {
        backends
            .min_up(|b| b.latency().as_nanos().min(u64::MAX as u128) as u64)
            .cloned()
    }
}

/// Uniformly random up backend.
#[derive(Debug, Default)]
pub struct UniformRandom;

impl LoadBalancer for UniformRandom {
    fn next_server(&self, backends: &Backends) -> Option<Arc<Backend>> {
        backends.up().random().cloned()
    }
}

/// Random up backend weighted by inverted squared latency.
#[derive(Debug, Default)]
pub struct WeightedLatency;

impl WeightedLatency {
    /// Squared latency in microseconds.
    pub fn weight(backend: &Backend) -> u64 {
        let micros = backend.latency().as_micros().min(u64::MAX as u128) as u64;
        micros.saturating_mul(micros)
    }
}

impl LoadBalancer for WeightedLatency {
    fn next_server(&self, backends: &Backends) -> Option<Arc<Backend>> {
        backends.up().weighted_random(WeightedLatency::weight).cloned()
    }
}

//! Least Connections load balancing strategy.

use std::sync::Arc;

use crate::load_balancer::{backend::Backend, selection::Backends, LoadBalancer};

/// Least connections selector.
/// Selects the up backend with the smallest advisory connection count.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for LeastConnections {
    fn next_server(&self, backends: &Backends) -> Option<Arc<Backend>> {
        // In case of tie, the first one is selected (stability)
        backends.min_up(|b| b.connections()).cloned()
    }
}

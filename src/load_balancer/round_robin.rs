//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, selection::Backends, LoadBalancer};

/// Round-robin selector.
/// Stores an internal counter to rotate through the up backends.
///
/// The counter is taken modulo the up-set size at call time, so the rotation
/// shifts when backends go up or down.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of selections attempted so far.
    pub fn cursor(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &Backends) -> Option<Arc<Backend>> {
        let up = backends.up();
        if up.is_empty() {
            return None;
        }
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        up.get(n % up.len()).cloned()
    }
}

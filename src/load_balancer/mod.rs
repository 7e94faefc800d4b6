//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Pool::next
//!     → strategy for the configured mode:
//!         - least_conn.rs (fewest advisory connections)
//!         - round_robin.rs (rotate through up backends)
//!         - strategy.rs (first-up, min-latency, random, weighted-latency)
//!     → selection.rs primitives over the backend collection
//!     → fallback: uniform random over every backend, up or down
//!     → backend.inc()
//!     → Endpoint handed to the caller's transport
//! ```
//!
//! # Design Decisions
//! - Strategies are stateless except round-robin's cursor
//! - Down backends are excluded from every primary strategy
//! - Selection never fails; the fallback may return a down backend
//! - The connection counter is never decremented; probes reconcile it

pub mod backend;
pub mod least_conn;
pub mod mode;
pub mod pool;
pub mod round_robin;
pub mod selection;
pub mod strategy;

use std::fmt;
use std::sync::Arc;

use backend::Backend;
use selection::Backends;

/// A selection strategy over a backend collection.
pub trait LoadBalancer: fmt::Debug + Send + Sync {
    /// Pick a backend, or `None` when no backend qualifies.
    fn next_server(&self, backends: &Backends) -> Option<Arc<Backend>>;
}

//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Backend::start
//!     → probe.rs (one synchronous probe)
//!     → monitor.rs (periodic timer, one task per backend)
//!         → probe.rs (INFO round trip, parse connected_clients)
//!         → state.rs (rise/fall hysteresis)
//!         → backend counters (connections, latency)
//! ```
//!
//! # Design Decisions
//! - Probing never blocks selection; they share only atomics
//! - State transitions require consecutive successes/failures
//! - Health state is per-backend, not per-pool

pub mod monitor;
pub mod probe;
pub mod state;

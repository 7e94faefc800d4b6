//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Backends and pool produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (gauges, counters, histograms via `metrics`)
//!
//! Consumers:
//!     → stdout (text or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are the backend address only, keeping cardinality bounded

pub mod logging;
pub mod metrics;

//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Normalize → Start backends (probe once, spawn monitor)
//!
//! Shutdown (shutdown.rs):
//!     Pool::close → trigger each backend's signal → join monitor → release transport
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → binary closes the pool and exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → BalancerConfig (serde defaults fill gaps)
//!     → normalize.rs (per-backend defaults and clamping)
//!     → Pool::new
//! ```
//!
//! # Design Decisions
//! - Config is consumed once at construction; nothing reloads it
//! - All fields have defaults to allow minimal configs
//! - An empty backend list is replaced by one default backend

pub mod loader;
pub mod normalize;
pub mod schema;

pub use loader::load_config;
pub use normalize::normalize;
pub use schema::{BackendConfig, BalancerConfig, LoggingConfig, MetricsConfig, Network};

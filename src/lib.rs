//! Client-side load balancer for a pool of interchangeable store backends.
//!
//! Each backend is probed in the background with `INFO`; `Pool::next` picks
//! one according to the configured [`BalanceMode`] and never fails.

pub mod config;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod transport;

pub use config::{BackendConfig, BalancerConfig, Network};
pub use error::{BalancerError, ConfigError, ProbeError};
pub use load_balancer::backend::{Backend, BackendStatus};
pub use load_balancer::mode::BalanceMode;
pub use load_balancer::pool::Pool;
pub use transport::{Connector, Endpoint, RespConnector, StatusSource};

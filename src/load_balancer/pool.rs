//! Backend pool management.
//!
//! # Responsibilities
//! - Start one monitored backend per configured entry
//! - Apply the configured strategy to select a backend
//! - Fall back to a random backend when the strategy finds none
//! - Stop every monitor on close

use futures_util::future::join_all;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{BackendConfig, BalancerConfig};
use crate::error::BalancerError;
use crate::load_balancer::{
    backend::{Backend, BackendStatus},
    mode::BalanceMode,
    selection::Backends,
    strategy, LoadBalancer,
};
use crate::observability::metrics;
use crate::transport::{self, BackendStream, Connector, Endpoint};

/// A balanced set of interchangeable backends.
#[derive(Debug)]
pub struct Pool {
    /// Never empty.
    backends: Backends,
    mode: BalanceMode,
    strategy: Box<dyn LoadBalancer>,
    dial_timeout: Duration,
}

impl Pool {
    /// Start monitoring every configured backend and build the pool.
    ///
    /// Each backend is probed once before this returns. An empty backend list
    /// is replaced by a single default backend.
    pub async fn new<C>(config: &BalancerConfig, connector: &C) -> Self
    where
        C: Connector + ?Sized,
    {
        let configs = config.normalized_backends();
        let backends = join_all(
            configs
                .iter()
                .map(|c| Backend::start(c, connector.connect(c))),
        )
        .await;

        let pool = Self::build(backends, config.mode, config.dial_timeout());
        tracing::info!(
            mode = %pool.mode,
            backends = pool.backends.len(),
            up = pool.backends.up().len(),
            "backend pool started"
        );
        pool
    }

    /// Build a pool over already-created backends without starting monitors.
    pub fn from_backends(backends: Vec<Arc<Backend>>, mode: BalanceMode) -> Self {
        Self::build(backends, mode, BalancerConfig::default().dial_timeout())
    }

    fn build(mut backends: Vec<Arc<Backend>>, mode: BalanceMode, dial_timeout: Duration) -> Self {
        if backends.is_empty() {
            backends.push(Arc::new(Backend::new(&BackendConfig::default())));
        }
        Self {
            backends: Backends::new(backends),
            mode,
            strategy: strategy::for_mode(mode),
            dial_timeout,
        }
    }

    pub fn mode(&self) -> BalanceMode {
        self.mode
    }

    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    pub fn status(&self) -> Vec<BackendStatus> {
        self.backends.iter().map(|b| b.status()).collect()
    }

    /// Network and address of the next backend to use.
    pub fn next(&self) -> Endpoint {
        self.next_backend().endpoint().clone()
    }

    /// Select a backend and count the selection against it.
    ///
    /// Never fails: when the strategy has no eligible backend, any backend
    /// (up or down) is picked at random.
    pub fn next_backend(&self) -> Arc<Backend> {
        let (backend, fallback) = match self.strategy.next_server(&self.backends) {
            Some(backend) => (backend, false),
            None => (self.fallback(), true),
        };

        if fallback {
            tracing::debug!(
                mode = %self.mode,
                backend = %backend.endpoint(),
                "no eligible backend, picked one at random"
            );
        }

        backend.inc();
        metrics::record_selection(backend.address(), fallback);
        backend
    }

    fn fallback(&self) -> Arc<Backend> {
        // backends is never empty
        let index = rand::thread_rng().gen_range(0..self.backends.len());
        self.backends[index].clone()
    }

    /// Select a backend and open a stream to it.
    pub async fn dial(&self) -> Result<BackendStream, BalancerError> {
        let endpoint = self.next();
        transport::dial(&endpoint, self.dial_timeout)
            .await
            .map_err(|source| BalancerError::Dial {
                address: endpoint.address().to_string(),
                source,
            })
    }

    /// Stop every backend monitor.
    ///
    /// All backends are closed even if some fail; the last error is returned.
    pub async fn close(&self) -> Result<(), BalancerError> {
        let mut last_err = None;
        for backend in self.backends.iter() {
            if let Err(e) = backend.close().await {
                tracing::warn!(
                    backend = %backend.endpoint(),
                    error = %e,
                    "failed to close backend"
                );
                last_err = Some(e);
            }
        }

        tracing::info!("backend pool closed");
        match last_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single monitored store endpoint
//! - Track the advisory connection count and last probe latency
//! - Track health state through rise/fall hysteresis
//! - Own the background monitor task and stop it on close
//!
//! A backend starts Down with zero connections and zero latency. [`Backend::start`]
//! runs one probe before returning, so a healthy backend with `rise = 1` is Up by
//! the time the pool hands it out.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::{normalize, BackendConfig, Network};
use crate::error::{BalancerError, ProbeError};
use crate::health::monitor::spawn_monitor;
use crate::health::probe::{run_probe, ProbeOutcome};
use crate::health::state::{HealthState, HealthTracker};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::transport::{Endpoint, StatusSource};

/// A single backend store instance.
#[derive(Debug)]
pub struct Backend {
    config: BackendConfig,
    endpoint: Endpoint,
    health: HealthTracker,
    /// Advisory load: bumped on every selection, overwritten by each successful probe.
    connections: AtomicU64,
    /// Duration of the most recent probe, in nanoseconds.
    latency_nanos: AtomicU64,
    worker: Mutex<Option<Worker>>,
}

#[derive(Debug)]
struct Worker {
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), ProbeError>>,
}

/// Point-in-time view of a backend, for logs and status output.
#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub network: Network,
    pub address: String,
    pub up: bool,
    pub connections: u64,
    pub latency_ms: f64,
    pub successes: u32,
    pub failures: u32,
}

impl Backend {
    /// Create an unmonitored backend from (possibly raw) options.
    pub fn new(config: &BackendConfig) -> Self {
        let config = normalize(config);
        Self {
            endpoint: Endpoint::from(&config),
            health: HealthTracker::new(config.rise, config.fall),
            connections: AtomicU64::new(0),
            latency_nanos: AtomicU64::new(0),
            worker: Mutex::new(None),
            config,
        }
    }

    /// Create a backend, probe it once, then start its periodic monitor.
    pub async fn start(config: &BackendConfig, mut source: Box<dyn StatusSource>) -> Arc<Self> {
        let backend = Arc::new(Self::new(config));
        backend.poll(source.as_mut()).await;

        let shutdown = Shutdown::new();
        let handle = spawn_monitor(&backend, source, shutdown.subscribe());
        *backend.worker.lock().await = Some(Worker { shutdown, handle });
        backend
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn network(&self) -> Network {
        self.endpoint.network
    }

    pub fn address(&self) -> &str {
        self.endpoint.address()
    }

    pub fn up(&self) -> bool {
        self.health.is_up()
    }

    pub fn down(&self) -> bool {
        !self.up()
    }

    pub fn health(&self) -> HealthState {
        self.health.state()
    }

    pub fn successes(&self) -> u32 {
        self.health.successes()
    }

    pub fn failures(&self) -> u32 {
        self.health.failures()
    }

    pub fn connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_nanos(self.latency_nanos.load(Ordering::Relaxed))
    }

    /// Account for one selection.
    pub fn inc(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn status(&self) -> BackendStatus {
        BackendStatus {
            network: self.network(),
            address: self.address().to_string(),
            up: self.up(),
            connections: self.connections(),
            latency_ms: self.latency().as_secs_f64() * 1_000.0,
            successes: self.successes(),
            failures: self.failures(),
        }
    }

    /// Probe once through `source` and apply the outcome.
    pub async fn poll(&self, source: &mut dyn StatusSource) {
        let outcome = run_probe(source).await;
        self.observe(&outcome);
    }

    /// Apply a probe outcome to the health counters and metrics.
    pub fn observe(&self, outcome: &ProbeOutcome) {
        let latency = outcome.latency();
        self.latency_nanos
            .store(latency.as_nanos().min(u64::MAX as u128) as u64, Ordering::Relaxed);

        let transition = match outcome {
            ProbeOutcome::Success { connections, .. } => {
                self.connections.store(*connections, Ordering::Relaxed);
                tracing::debug!(
                    backend = %self.endpoint,
                    connections,
                    latency_us = latency.as_micros() as u64,
                    "probe succeeded"
                );
                self.health.record_success()
            }
            ProbeOutcome::Failure { error, .. } => {
                tracing::debug!(
                    backend = %self.endpoint,
                    error = %error,
                    "probe failed"
                );
                self.health.record_failure()
            }
        };

        match transition {
            Some(HealthState::Up) => {
                tracing::info!(backend = %self.endpoint, "backend is up");
            }
            Some(HealthState::Down) => {
                tracing::warn!(
                    backend = %self.endpoint,
                    failures = self.health.failures(),
                    "backend is down"
                );
            }
            None => {}
        }

        metrics::record_probe(self.address(), outcome.is_success(), latency);
        metrics::record_backend_health(self.address(), self.up());
        metrics::record_backend_connections(self.address(), self.connections());
    }

    /// Stop the monitor, wait for it to exit and release the transport.
    ///
    /// A probe already in flight finishes first. Closing twice is a no-op.
    pub async fn close(&self) -> Result<(), BalancerError> {
        let Some(worker) = self.worker.lock().await.take() else {
            return Ok(());
        };

        worker.shutdown.trigger();
        match worker.handle.await {
            Ok(result) => result.map_err(BalancerError::from),
            Err(e) => Err(BalancerError::Task(e.to_string())),
        }
    }

    pub async fn is_monitored(&self) -> bool {
        self.worker.lock().await.is_some()
    }

    #[cfg(test)]
    pub(crate) fn with_state(address: &str, up: bool, connections: u64, latency: Duration) -> Self {
        let backend = Self::new(&BackendConfig::tcp(address));
        backend.health.set_up(up);
        backend.connections.store(connections, Ordering::Relaxed);
        backend
            .latency_nanos
            .store(latency.as_nanos() as u64, Ordering::Relaxed);
        backend
    }

    #[cfg(test)]
    pub(crate) fn set_up(&self, up: bool) {
        self.health.set_up(up);
    }
}

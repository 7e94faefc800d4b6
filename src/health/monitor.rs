//! Active health monitoring.
//!
//! # Responsibilities
//! - Probe one backend on a fixed interval
//! - Stop cooperatively on the shutdown signal
//! - Release the backend's transport on exit

use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::error::ProbeError;
use crate::load_balancer::backend::Backend;
use crate::transport::StatusSource;

/// Spawn the periodic monitor for `backend`.
///
/// The first tick fires one interval from now; the caller is expected to have
/// probed once already. The task holds only a weak reference, so dropping the
/// backend also ends the loop. The returned handle yields the transport close
/// result.
pub fn spawn_monitor(
    backend: &Arc<Backend>,
    mut source: Box<dyn StatusSource>,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<Result<(), ProbeError>> {
    let weak: Weak<Backend> = Arc::downgrade(backend);
    let interval = backend.config().check_interval();
    let endpoint = backend.endpoint().clone();

    tokio::spawn(async move {
        tracing::debug!(
            backend = %endpoint,
            interval_ms = interval.as_millis() as u64,
            "health monitor starting"
        );

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::debug!(backend = %endpoint, "health monitor received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let Some(backend) = weak.upgrade() else {
                break;
            };
            // An in-flight probe always completes; shutdown is observed on the next turn.
            backend.poll(source.as_mut()).await;
        }

        let result = source.close().await;
        if let Err(e) = &result {
            tracing::warn!(backend = %endpoint, error = %e, "failed to release transport");
        }
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::lifecycle::Shutdown;
    use futures_util::future::BoxFuture;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct Counting {
        calls: Arc<AtomicUsize>,
        closed: Arc<AtomicBool>,
    }

    impl StatusSource for Counting {
        fn fetch_status(&mut self) -> BoxFuture<'_, Result<String, ProbeError>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
            Box::pin(async move { Ok(format!("connected_clients:{}", n)) })
        }

        fn close(&mut self) -> BoxFuture<'_, Result<(), ProbeError>> {
            self.closed.store(true, Ordering::SeqCst);
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_probes_on_interval_and_stops() {
        let config = BackendConfig {
            check_interval_ms: 200,
            ..BackendConfig::tcp("h:1")
        };
        let backend = Arc::new(Backend::new(&config));
        let calls = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicBool::new(false));
        let source = Box::new(Counting {
            calls: calls.clone(),
            closed: closed.clone(),
        });

        let shutdown = Shutdown::new();
        let handle = spawn_monitor(&backend, source, shutdown.subscribe());

        time::sleep(Duration::from_millis(650)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(backend.up());

        shutdown.trigger();
        handle.await.unwrap().unwrap();
        assert!(closed.load(Ordering::SeqCst));

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_exits_when_backend_dropped() {
        let backend = Arc::new(Backend::new(&BackendConfig::tcp("h:1")));
        let closed = Arc::new(AtomicBool::new(false));
        let source = Box::new(Counting {
            calls: Arc::new(AtomicUsize::new(0)),
            closed: closed.clone(),
        });

        let shutdown = Shutdown::new();
        let handle = spawn_monitor(&backend, source, shutdown.subscribe());
        drop(backend);

        time::sleep(Duration::from_secs(2)).await;
        handle.await.unwrap().unwrap();
        assert!(closed.load(Ordering::SeqCst));
    }
}

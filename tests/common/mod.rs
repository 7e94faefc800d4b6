//! Shared utilities for integration tests.

#![allow(dead_code)]

use futures_util::future::BoxFuture;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use store_balancer::{BackendConfig, Connector, ProbeError, StatusSource};

/// Canned INFO reply carrying `connected_clients`.
pub fn info_reply(connected_clients: u64) -> String {
    format!(
        "# Clients\r\nconnected_clients:{}\r\nblocked_clients:0\r\n",
        connected_clients
    )
}

/// Shared, inspectable script for one backend's probes.
#[derive(Debug, Default)]
pub struct Script {
    replies: Mutex<VecDeque<(Result<String, String>, Option<Duration>)>>,
    /// Reply once the queue is drained; `None` means failure.
    fallback: Mutex<Option<String>>,
    calls: AtomicUsize,
    closed: AtomicBool,
    pub fail_close: AtomicBool,
}

impl Script {
    pub fn healthy(connected_clients: u64) -> Arc<Self> {
        let script = Self::default();
        *script.fallback.lock().unwrap() = Some(info_reply(connected_clients));
        Arc::new(script)
    }

    pub fn unhealthy() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, connected_clients: u64) {
        self.replies
            .lock()
            .unwrap()
            .push_back((Ok(info_reply(connected_clients)), None));
    }

    /// Queue a successful reply that takes `delay` to arrive.
    pub fn push_slow(&self, connected_clients: u64, delay: Duration) {
        self.replies
            .lock()
            .unwrap()
            .push_back((Ok(info_reply(connected_clients)), Some(delay)));
    }

    pub fn push_err(&self) {
        self.replies
            .lock()
            .unwrap()
            .push_back((Err("connection refused".to_string()), None));
    }

    pub fn set_fallback(&self, reply: Option<String>) {
        *self.fallback.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> (Result<String, ProbeError>, Option<Duration>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.replies.lock().unwrap().pop_front();
        let (reply, delay) = match queued {
            Some(entry) => entry,
            None => {
                let fallback = self.fallback.lock().unwrap().clone();
                (fallback.ok_or_else(|| "connection refused".to_string()), None)
            }
        };
        (reply.map_err(ProbeError::Protocol), delay)
    }
}

struct ScriptedSource(Arc<Script>);

impl StatusSource for ScriptedSource {
    fn fetch_status(&mut self) -> BoxFuture<'_, Result<String, ProbeError>> {
        let (reply, delay) = self.0.next_reply();
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            reply
        })
    }

    fn close(&mut self) -> BoxFuture<'_, Result<(), ProbeError>> {
        self.0.closed.store(true, Ordering::SeqCst);
        let fail = self.0.fail_close.load(Ordering::SeqCst);
        Box::pin(async move {
            if fail {
                Err(ProbeError::Protocol("close failed".to_string()))
            } else {
                Ok(())
            }
        })
    }
}

/// Connector handing out scripted sources keyed by backend address.
#[derive(Default)]
pub struct ScriptedConnector {
    scripts: HashMap<String, Arc<Script>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, script: Arc<Script>) -> Self {
        self.scripts.insert(address.to_string(), script);
        self
    }

    pub fn script(&self, address: &str) -> Arc<Script> {
        self.scripts[address].clone()
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, config: &BackendConfig) -> Box<dyn StatusSource> {
        let script = self
            .scripts
            .get(&config.address)
            .cloned()
            .unwrap_or_else(Script::unhealthy);
        Box::new(ScriptedSource(script))
    }
}

/// Start a fake store that answers every `INFO` with `connected_clients`.
///
/// Returns the bound address and a handle to change the reported value.
pub async fn start_fake_store(connected_clients: u64) -> (SocketAddr, Arc<AtomicU64>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let clients = Arc::new(AtomicU64::new(connected_clients));
    let reported = clients.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let reported = reported.clone();
                    tokio::spawn(async move {
                        // "*1\r\n$4\r\nINFO\r\n"
                        let mut request = [0u8; 14];
                        while socket.read_exact(&mut request).await.is_ok() {
                            let body = info_reply(reported.load(Ordering::SeqCst));
                            let reply = format!("${}\r\n{}\r\n", body.len(), body);
                            if socket.write_all(reply.as_bytes()).await.is_err() {
                                break;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, clients)
}

/// An address nothing listens on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

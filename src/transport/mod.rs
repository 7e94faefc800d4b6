//! Transport seam between the balancer core and the store.
//!
//! # Data Flow
//! ```text
//! Pool::new
//!     → Connector::connect (one StatusSource per backend)
//!     → monitor task owns the source
//!     → fetch_status() once per interval
//!     → close() when the monitor exits
//!
//! Pool::dial
//!     → Pool::next
//!     → dial() opens a fresh stream to the chosen endpoint
//! ```
//!
//! # Design Decisions
//! - The core only needs the textual status reply; the store protocol stays here
//! - Sources are exclusively owned by their monitor task, so no locking
//! - `dial` is a convenience for callers that want a raw stream to the pick

pub mod resp;

use futures_util::future::BoxFuture;
use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::time;

use crate::config::{BackendConfig, Network};
use crate::error::ProbeError;

pub use resp::{RespConnector, RespSource};

/// Network kind and address of a backend. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub network: Network,
    pub address: Arc<str>,
}

impl Endpoint {
    pub fn new(network: Network, address: impl Into<Arc<str>>) -> Self {
        Self {
            network,
            address: address.into(),
        }
    }

    #[inline]
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl From<&BackendConfig> for Endpoint {
    fn from(config: &BackendConfig) -> Self {
        Self::new(config.network, config.address.as_str())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.network, self.address)
    }
}

/// Issues the status query against one backend.
pub trait StatusSource: Send + 'static {
    /// Send one status request and return the raw textual reply.
    fn fetch_status(&mut self) -> BoxFuture<'_, Result<String, ProbeError>>;

    /// Release any held connection.
    fn close(&mut self) -> BoxFuture<'_, Result<(), ProbeError>>;
}

/// Creates a [`StatusSource`] for each backend of a pool.
pub trait Connector: Send + Sync {
    fn connect(&self, config: &BackendConfig) -> Box<dyn StatusSource>;
}

/// A connected TCP or unix stream.
#[derive(Debug)]
pub enum BackendStream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(tokio::net::UnixStream),
}

/// Open a stream to `endpoint`, giving up after `timeout`.
pub async fn dial(endpoint: &Endpoint, timeout: Duration) -> Result<BackendStream, ProbeError> {
    let connect = async {
        match endpoint.network {
            Network::Tcp => Ok(BackendStream::Tcp(TcpStream::connect(endpoint.address()).await?)),
            #[cfg(unix)]
            Network::Unix => Ok(BackendStream::Unix(
                tokio::net::UnixStream::connect(endpoint.address()).await?,
            )),
            #[cfg(not(unix))]
            Network::Unix => Err(ProbeError::Protocol(
                "unix sockets are not supported on this platform".to_string(),
            )),
        }
    };

    match time::timeout(timeout, connect).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout(timeout)),
    }
}

impl AsyncRead for BackendStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            BackendStream::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            #[cfg(unix)]
            BackendStream::Unix(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for BackendStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            BackendStream::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            #[cfg(unix)]
            BackendStream::Unix(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            BackendStream::Tcp(s) => Pin::new(s).poll_flush(cx),
            #[cfg(unix)]
            BackendStream::Unix(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            BackendStream::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            #[cfg(unix)]
            BackendStream::Unix(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

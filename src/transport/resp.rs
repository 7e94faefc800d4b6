//! Minimal RESP client issuing `INFO`.
//!
//! Only the subset needed for a status probe is implemented: one request
//! array out, one bulk/simple/error reply in.

use futures_util::future::BoxFuture;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::time;

use crate::config::BackendConfig;
use crate::error::ProbeError;
use crate::transport::{dial, BackendStream, Connector, Endpoint, StatusSource};

const INFO_COMMAND: &[u8] = b"*1\r\n$4\r\nINFO\r\n";

/// Upper bound on an accepted bulk reply.
const MAX_REPLY_BYTES: usize = 16 * 1024 * 1024;

/// Builds a [`RespSource`] per backend.
#[derive(Debug, Clone)]
pub struct RespConnector {
    timeout: Duration,
}

impl RespConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for RespConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl Connector for RespConnector {
    fn connect(&self, config: &BackendConfig) -> Box<dyn StatusSource> {
        Box::new(RespSource::new(Endpoint::from(config), self.timeout))
    }
}

/// Persistent status connection to one backend.
///
/// Dials lazily and redials after any failed exchange.
#[derive(Debug)]
pub struct RespSource {
    endpoint: Endpoint,
    timeout: Duration,
    stream: Option<BufReader<BackendStream>>,
}

impl RespSource {
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Self {
        Self {
            endpoint,
            timeout,
            stream: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn exchange(&mut self) -> Result<String, ProbeError> {
        if self.stream.is_none() {
            let stream = dial(&self.endpoint, self.timeout).await?;
            self.stream = Some(BufReader::new(stream));
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(ProbeError::Protocol("connection unavailable".to_string()));
        };

        stream.get_mut().write_all(INFO_COMMAND).await?;
        stream.get_mut().flush().await?;
        read_reply(stream).await
    }
}

impl StatusSource for RespSource {
    fn fetch_status(&mut self) -> BoxFuture<'_, Result<String, ProbeError>> {
        Box::pin(async move {
            let timeout = self.timeout;
            let result = match time::timeout(timeout, self.exchange()).await {
                Ok(result) => result,
                Err(_) => Err(ProbeError::Timeout(timeout)),
            };
            if result.is_err() {
                self.stream = None;
            }
            result
        })
    }

    fn close(&mut self) -> BoxFuture<'_, Result<(), ProbeError>> {
        Box::pin(async move {
            let Some(mut stream) = self.stream.take() else {
                return Ok(());
            };
            match stream.get_mut().shutdown().await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }
}

/// Read a single RESP reply and return its text payload.
pub async fn read_reply<R>(reader: &mut R) -> Result<String, ProbeError>
where
    R: AsyncBufRead + Unpin,
{
    let mut header = String::new();
    if reader.read_line(&mut header).await? == 0 {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    let header = header.trim_end_matches(['\r', '\n']);

    let Some(kind) = header.chars().next() else {
        return Err(ProbeError::Protocol("empty reply".to_string()));
    };
    let body = &header[kind.len_utf8()..];

    match kind {
        '+' => Ok(body.to_string()),
        '-' => Err(ProbeError::Protocol(format!("server error: {}", body))),
        '$' => {
            let len: i64 = body
                .parse()
                .map_err(|_| ProbeError::Protocol(format!("invalid bulk length: {}", body)))?;
            if len < 0 {
                return Err(ProbeError::Protocol("nil reply".to_string()));
            }
            let len = len as usize;
            if len > MAX_REPLY_BYTES {
                return Err(ProbeError::Protocol(format!("reply too large: {} bytes", len)));
            }

            let mut payload = vec![0u8; len + 2];
            reader.read_exact(&mut payload).await?;
            if !payload.ends_with(b"\r\n") {
                return Err(ProbeError::Protocol("bulk reply not terminated".to_string()));
            }
            payload.truncate(len);
            Ok(String::from_utf8_lossy(&payload).into_owned())
        }
        other => Err(ProbeError::Protocol(format!("unexpected reply type '{}'", other))),
    }
}

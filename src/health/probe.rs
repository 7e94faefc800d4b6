//! A single status probe.
//!
//! # Responsibilities
//! - Issue one status query through the backend's [`StatusSource`]
//! - Measure round-trip latency, including failed attempts
//! - Extract `connected_clients` as the load metric

use regex::Regex;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use crate::error::ProbeError;
use crate::transport::StatusSource;

static CONNECTED_CLIENTS: OnceLock<Regex> = OnceLock::new();

fn connected_clients_pattern() -> &'static Regex {
    CONNECTED_CLIENTS
        .get_or_init(|| Regex::new(r"connected_clients:(\d+)").expect("static pattern is valid"))
}

/// Extract the `connected_clients` value from a status reply.
pub fn parse_connected_clients(info: &str) -> Option<u64> {
    connected_clients_pattern()
        .captures(info)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Result of one probe.
#[derive(Debug)]
pub enum ProbeOutcome {
    Success { connections: u64, latency: Duration },
    Failure { latency: Duration, error: ProbeError },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }

    pub fn latency(&self) -> Duration {
        match self {
            ProbeOutcome::Success { latency, .. } | ProbeOutcome::Failure { latency, .. } => {
                *latency
            }
        }
    }
}

/// Run one status exchange and classify it.
pub async fn run_probe(source: &mut dyn StatusSource) -> ProbeOutcome {
    let start = Instant::now();
    let result = source.fetch_status().await;
    let latency = start.elapsed();

    let error = match result {
        Ok(info) => match parse_connected_clients(&info) {
            Some(connections) => return ProbeOutcome::Success { connections, latency },
            None => ProbeError::MissingMetric,
        },
        Err(e) => e,
    };
    ProbeOutcome::Failure { latency, error }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::BoxFuture;

    struct Fixed(Option<&'static str>);

    impl StatusSource for Fixed {
        fn fetch_status(&mut self) -> BoxFuture<'_, Result<String, ProbeError>> {
            let reply = self.0;
            Box::pin(async move {
                reply
                    .map(str::to_string)
                    .ok_or_else(|| ProbeError::Protocol("connection reset".into()))
            })
        }

        fn close(&mut self) -> BoxFuture<'_, Result<(), ProbeError>> {
            Box::pin(async { Ok(()) })
        }
    }

    #[test]
    fn test_parse_connected_clients() {
        let info = "# Clients\r\nconnected_clients:42\r\nblocked_clients:0\r\n";
        assert_eq!(parse_connected_clients(info), Some(42));
        assert_eq!(parse_connected_clients("connected_clients:0"), Some(0));
        assert_eq!(parse_connected_clients("# Server\r\nredis_version:7.2.0"), None);
        assert_eq!(parse_connected_clients("connected_clients:"), None);
        assert_eq!(parse_connected_clients(""), None);
    }

    #[tokio::test]
    async fn test_probe_success() {
        let mut source = Fixed(Some("connected_clients:5\r\n"));
        match run_probe(&mut source).await {
            ProbeOutcome::Success { connections, .. } => assert_eq!(connections, 5),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_missing_metric_is_failure() {
        let mut source = Fixed(Some("# Server\r\nuptime_in_seconds:10\r\n"));
        let outcome = run_probe(&mut source).await;
        assert!(!outcome.is_success());
        assert!(matches!(
            outcome,
            ProbeOutcome::Failure { error: ProbeError::MissingMetric, .. }
        ));
    }

    #[tokio::test]
    async fn test_probe_transport_error_is_failure() {
        let mut source = Fixed(None);
        let outcome = run_probe(&mut source).await;
        assert!(matches!(
            outcome,
            ProbeOutcome::Failure { error: ProbeError::Protocol(_), .. }
        ));
    }
}

// src/checker/probe.rs
// =============================================================================
// This module checks if a single URL is alive.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Judges the first response only: redirects are not followed
// - Gives up after a fixed timeout (2 seconds by default)
// - Folds every failure into a simple Alive / Dead answer
//
// A link is Dead when:
// - the server answers with a status from DEAD_STATUS_CODES
// - the request takes longer than the timeout
// - the connection fails (DNS, refused, TLS, invalid URL, ...)
// Anything else is Alive, including 301/302 (whatever they point to), 403
// and other codes outside the list.
//
// The network sits behind the Transport trait so tests can swap in a mock.
//
// Rust concepts:
// - Traits: Transport is an interface with one async method
// - async-trait: Lets us write `async fn` inside a trait
// - Arc<dyn Trait>: Shared ownership of "some type implementing Transport"
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::model::{DeadReason, ProbeResult};

/// Status codes that mark a link as dead
pub const DEAD_STATUS_CODES: [u16; 10] = [400, 401, 402, 404, 406, 410, 413, 500, 502, 504];

/// How long a probe waits before calling the link dead
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Returns true if `code` is in the dead-status blocklist
pub fn is_dead_status(code: u16) -> bool {
    DEAD_STATUS_CODES.contains(&code)
}

/// Errors a transport can report for one request
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else if error.is_builder() {
            TransportError::InvalidUrl(error.to_string())
        } else {
            TransportError::Other(error.to_string())
        }
    }
}

/// Something that can send a HEAD request and report the final status code
#[async_trait]
pub trait Transport: Send + Sync {
    async fn head(&self, url: &str) -> Result<u16, TransportError>;
}

/// The real transport, backed by reqwest
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a client that does not follow redirects and keeps no idle
    /// connections, so every probe opens its own connection.
    ///
    /// A redirect answer is itself the verdict: a 301 to a missing page is
    /// still Alive.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .user_agent(concat!("link-sweeper/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn head(&self, url: &str) -> Result<u16, TransportError> {
        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(TransportError::InvalidUrl(format!("unsupported scheme in {}", url)));
        }

        let response = self.client.head(parsed).send().await?;
        Ok(response.status().as_u16())
    }
}

/// Probes URLs through a transport under a fixed timeout.
///
/// Cloning is cheap: the transport is shared behind an Arc and the probe
/// holds no mutable state, so many workers can use it at once.
#[derive(Clone)]
pub struct UrlProbe {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl UrlProbe {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// A probe using the real network
    pub fn with_reqwest(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::new(Arc::new(ReqwestTransport::new(timeout)?), timeout))
    }

    /// Checks one URL and classifies it as Alive or Dead.
    ///
    /// Never fails: errors are part of the answer.
    pub async fn probe(&self, url: &str) -> ProbeResult {
        let outcome = tokio::time::timeout(self.timeout, self.transport.head(url)).await;

        let result = match outcome {
            Err(_elapsed) => ProbeResult::Dead(DeadReason::Timeout),
            Ok(Err(TransportError::Timeout)) => ProbeResult::Dead(DeadReason::Timeout),
            Ok(Err(e)) => ProbeResult::Dead(DeadReason::Unreachable(e.to_string())),
            Ok(Ok(code)) if is_dead_status(code) => ProbeResult::Dead(DeadReason::Status(code)),
            Ok(Ok(_)) => ProbeResult::Alive,
        };

        debug!(url, ?result, "probed link");
        result
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Transport trait?
//    - UrlProbe only needs "send HEAD, give me a status code"
//    - Tests implement the trait with canned answers, no network needed
//
// 2. What does tokio::time::timeout do?
//    - Wraps a future and gives up if it doesn't finish in time
//    - Returns Err(Elapsed) on timeout, Ok(value) otherwise
//
// 3. Why match guards (`if is_dead_status(code)`)?
//    - They add an extra condition to a pattern
//    - The first arm that matches wins, so order matters
// -----------------------------------------------------------------------------

//! Health client for the local embedding server.
//!
//! A second, independent client against the same server's `GET /health`
//! endpoint. It is used by diagnostics (`repomind doctor`), never by
//! embedding traffic, and deliberately never errors: "unreachable" is a
//! normal answer for a reachability question, so every failure mode
//! normalizes to `false`.

use std::time::Duration;

use super::local_http::endpoint_url;
use super::transport::{CancelToken, HttpTransport, ReqwestTransport};
use crate::error::Result;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness prober for the embedding server.
pub struct EmbeddingServerClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    health_url: String,
    timeout: Duration,
}

impl EmbeddingServerClient {
    /// Create a client with the default transport and timeout (5s).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `base_url` is blank.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_transport(ReqwestTransport::new(), base_url, DEFAULT_TIMEOUT)
    }
}

impl<T: HttpTransport> EmbeddingServerClient<T> {
    /// Create a client over an explicit transport.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `base_url` is blank.
    pub fn with_transport(transport: T, base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            transport,
            health_url: endpoint_url(base_url, "health")?,
            timeout,
        })
    }

    /// Probe the server once. `true` only for an exact HTTP 200; any
    /// other status, transport failure, timeout, or cancellation is
    /// `false`. Cancellation stays observable on the token, but no error
    /// propagates from this call.
    #[must_use]
    pub fn is_healthy(&self, cancel: &CancelToken) -> bool {
        match self.transport.get(&self.health_url, self.timeout, cancel) {
            Ok(result) => result.status == 200,
            Err(_) => false,
        }
    }
}

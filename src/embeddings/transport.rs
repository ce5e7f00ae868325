//! Minimal blocking HTTP transport.
//!
//! The embedding provider and the health client depend on HTTP through
//! the [`HttpTransport`] trait, never on a concrete client, so tests can
//! substitute recording or failing doubles. The production implementation
//! wraps the blocking reqwest client.
//!
//! All calls are blocking with an explicit per-request timeout and take a
//! [`CancelToken`]. Cancellation is cooperative: a cancelled call fails
//! with [`TransportError::Cancelled`] and the token stays set, so callers
//! further up the stack can still observe the intent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Cooperative cancellation handle shared between a caller and a blocking
/// call. Cancelling is sticky; the flag is never reset by the callee.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any clone of the token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Status code and raw payload of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResult {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResult {
    /// Response body as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Failures below the protocol level.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The caller's token was cancelled before or during the request.
    #[error("request cancelled")]
    Cancelled,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Blocking HTTP capability: `POST` and `GET` with a timeout.
///
/// Implementations hold no mutable state beyond their fixed configuration
/// and are safe to reuse across sequential calls.
pub trait HttpTransport: Send + Sync {
    /// POST a JSON payload, returning status and raw body.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on cancellation, timeout, or any
    /// failure to complete the exchange. Non-2xx statuses are NOT errors
    /// at this layer; callers interpret the status code.
    fn post(
        &self,
        url: &str,
        body: &[u8],
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<HttpResult, TransportError>;

    /// GET a URL, returning status and raw body.
    ///
    /// # Errors
    ///
    /// Same contract as [`HttpTransport::post`].
    fn get(
        &self,
        url: &str,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<HttpResult, TransportError>;
}

/// Shared transports (e.g. a test double inspected after the call) work
/// through `Arc` without a wrapper type.
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn post(
        &self,
        url: &str,
        body: &[u8],
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<HttpResult, TransportError> {
        (**self).post(url, body, timeout, cancel)
    }

    fn get(
        &self,
        url: &str,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<HttpResult, TransportError> {
        (**self).get(url, timeout, cancel)
    }
}

/// Production transport over `reqwest::blocking`.
#[derive(Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The token is checked before the request goes on the wire; a request
    /// already in flight runs to its timeout.
    fn check_cancelled(cancel: &CancelToken) -> Result<(), TransportError> {
        if cancel.is_cancelled() {
            Err(TransportError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn post(
        &self,
        url: &str,
        body: &[u8],
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<HttpResult, TransportError> {
        Self::check_cancelled(cancel)?;
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .timeout(timeout)
            .send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(HttpResult { status, body })
    }

    fn get(
        &self,
        url: &str,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<HttpResult, TransportError> {
        Self::check_cancelled(cancel)?;
        let response = self.client.get(url).timeout(timeout).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(HttpResult { status, body })
    }
}

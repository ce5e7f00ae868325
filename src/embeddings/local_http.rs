//! Local HTTP embedding provider.
//!
//! Talks to the local embedding server's `POST /embed` endpoint. Inputs
//! are partitioned into contiguous batches of at most `batch_size` texts
//! and sent strictly sequentially; the next batch is not issued until the
//! previous response arrived. Ordering of the concatenated result follows
//! trivially, at the cost of latency proportional to the batch count.
//!
//! A batch succeeds only on HTTP 200 with an `embeddings` array of
//! exactly the batch's length. Any batch failure fails the whole call;
//! results from earlier batches are discarded. Retry policy belongs to
//! the caller.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

use super::provider::EmbeddingProvider;
use super::transport::{CancelToken, HttpTransport, ReqwestTransport, TransportError};

const DEFAULT_BATCH_SIZE: usize = 32;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Embedding provider backed by the local embedding server.
pub struct LocalHttpProvider<T: HttpTransport = ReqwestTransport> {
    transport: T,
    embed_url: String,
    batch_size: usize,
    timeout: Duration,
}

/// Request body for `POST /embed`.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

/// Response body for `POST /embed`.
///
/// Components may be `null` in the wire form; those become `0.0`. An
/// entirely-null row becomes an empty vector.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Option<Vec<Option<Vec<Option<f32>>>>>,
}

impl LocalHttpProvider {
    /// Create a provider with the default transport, batch size (32) and
    /// timeout (30s).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `base_url` is blank.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_transport(
            ReqwestTransport::new(),
            base_url,
            DEFAULT_BATCH_SIZE,
            DEFAULT_TIMEOUT,
        )
    }
}

impl<T: HttpTransport> LocalHttpProvider<T> {
    /// Create a provider over an explicit transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `base_url` is blank or
    /// `batch_size` is zero. Validation happens here, before any network
    /// activity.
    pub fn with_transport(
        transport: T,
        base_url: &str,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidArgument(
                "batch_size must be positive".to_string(),
            ));
        }
        Ok(Self {
            transport,
            embed_url: endpoint_url(base_url, "embed")?,
            batch_size,
            timeout,
        })
    }

    /// Issue one batch request and validate the response shape.
    fn fetch_batch(&self, batch: &[String], cancel: &CancelToken) -> Result<Vec<Vec<f32>>> {
        let payload = serde_json::to_vec(&EmbedRequest { inputs: batch })
            .map_err(|e| Error::Embedding(format!("Failed to encode embed request: {e}")))?;

        let response = self
            .transport
            .post(&self.embed_url, &payload, self.timeout, cancel)
            .map_err(|e| match e {
                TransportError::Cancelled => {
                    Error::Embedding("Embedding request cancelled".to_string())
                }
                other => Error::Embedding(format!("Embedding request failed: {other}")),
            })?;

        if response.status != 200 {
            return Err(Error::Embedding(format!(
                "Embedding server error: HTTP {} - {}",
                response.status,
                response.body_text()
            )));
        }

        let parsed: EmbedResponse = serde_json::from_slice(&response.body)
            .map_err(|e| Error::Embedding(format!("Failed to parse embedding response: {e}")))?;

        let Some(embeddings) = parsed.embeddings else {
            return Err(Error::Embedding(
                "Embedding server response missing embeddings".to_string(),
            ));
        };
        if embeddings.len() != batch.len() {
            return Err(Error::Embedding(format!(
                "Embedding server response size mismatch: expected {}, got {}",
                batch.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings
            .into_iter()
            .map(|row| {
                row.map_or_else(Vec::new, |components| {
                    components
                        .into_iter()
                        .map(Option::unwrap_or_default)
                        .collect()
                })
            })
            .collect())
    }
}

impl<T: HttpTransport> EmbeddingProvider for LocalHttpProvider<T> {
    fn embed(&self, inputs: &[String], cancel: &CancelToken) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(inputs.len());
        for (index, batch) in inputs.chunks(self.batch_size).enumerate() {
            debug!(batch = index, size = batch.len(), "Requesting embeddings");
            results.extend(self.fetch_batch(batch, cancel)?);
        }
        Ok(results)
    }
}

/// Resolve an endpoint relative to the configured base URL.
///
/// Trailing slashes on the base are tolerated, so `http://host:8088` and
/// `http://host:8088/` both resolve to `http://host:8088/embed`.
pub(super) fn endpoint_url(base_url: &str, endpoint: &str) -> Result<String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("base_url is required".to_string()));
    }
    Ok(format!("{}/{endpoint}", trimmed.trim_end_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::transport::HttpResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Answers each batch with one single-component vector per input,
    /// valued at the input's length, and records every request.
    #[derive(Default)]
    struct RecordingTransport {
        calls: AtomicUsize,
        bodies: Mutex<Vec<serde_json::Value>>,
        urls: Mutex<Vec<String>>,
    }

    impl HttpTransport for RecordingTransport {
        fn post(
            &self,
            url: &str,
            body: &[u8],
            _timeout: Duration,
            _cancel: &CancelToken,
        ) -> std::result::Result<HttpResult, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());

            let payload: serde_json::Value = serde_json::from_slice(body).unwrap();
            self.bodies.lock().unwrap().push(payload.clone());

            let embeddings: Vec<Vec<f32>> = payload["inputs"]
                .as_array()
                .unwrap()
                .iter()
                .map(|input| vec![input.as_str().unwrap().len() as f32])
                .collect();
            let body = serde_json::to_vec(&serde_json::json!({ "embeddings": embeddings })).unwrap();
            Ok(HttpResult { status: 200, body })
        }

        fn get(
            &self,
            _url: &str,
            _timeout: Duration,
            _cancel: &CancelToken,
        ) -> std::result::Result<HttpResult, TransportError> {
            Ok(HttpResult {
                status: 200,
                body: Vec::new(),
            })
        }
    }

    /// Returns canned responses in sequence, one per POST.
    struct ScriptedTransport {
        responses: Mutex<Vec<std::result::Result<HttpResult, TransportError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<std::result::Result<HttpResult, TransportError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        fn json_ok(value: &serde_json::Value) -> std::result::Result<HttpResult, TransportError> {
            Ok(HttpResult {
                status: 200,
                body: serde_json::to_vec(value).unwrap(),
            })
        }
    }

    impl HttpTransport for ScriptedTransport {
        fn post(
            &self,
            _url: &str,
            _body: &[u8],
            _timeout: Duration,
            cancel: &CancelToken,
        ) -> std::result::Result<HttpResult, TransportError> {
            if cancel.is_cancelled() {
                return Err(TransportError::Cancelled);
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses.lock().unwrap().remove(0)
        }

        fn get(
            &self,
            _url: &str,
            _timeout: Duration,
            _cancel: &CancelToken,
        ) -> std::result::Result<HttpResult, TransportError> {
            Ok(HttpResult {
                status: 200,
                body: Vec::new(),
            })
        }
    }

    fn inputs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| (*t).to_string()).collect()
    }

    fn provider<T: HttpTransport>(transport: T, batch_size: usize) -> LocalHttpProvider<T> {
        LocalHttpProvider::with_transport(
            transport,
            "http://localhost:8088",
            batch_size,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn embed_batches_requests_and_preserves_order() {
        let transport = Arc::new(RecordingTransport::default());
        let provider = provider(Arc::clone(&transport), 2);

        let results = provider
            .embed(&inputs(&["one", "two", "three"]), &CancelToken::new())
            .unwrap();

        // ceil(3/2) = 2 requests: ["one","two"] then ["three"]
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(bodies[0]["inputs"], serde_json::json!(["one", "two"]));
        assert_eq!(bodies[1]["inputs"], serde_json::json!(["three"]));

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], vec![3.0]);
        assert_eq!(results[1], vec![3.0]);
        assert_eq!(results[2], vec![5.0]);
    }

    #[test]
    fn embed_posts_to_embed_endpoint() {
        let transport = Arc::new(RecordingTransport::default());
        let provider = provider(Arc::clone(&transport), 8);

        provider
            .embed(&inputs(&["one"]), &CancelToken::new())
            .unwrap();

        let urls = transport.urls.lock().unwrap();
        assert_eq!(urls[0], "http://localhost:8088/embed");
    }

    #[test]
    fn embed_returns_empty_without_requests() {
        let transport = Arc::new(RecordingTransport::default());
        let provider = provider(Arc::clone(&transport), 8);

        let results = provider.embed(&[], &CancelToken::new()).unwrap();

        assert!(results.is_empty());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn null_components_become_zero() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::json_ok(
            &serde_json::json!({ "embeddings": [[1.5, null, 2.5]] }),
        )]);
        let provider = provider(transport, 8);

        let results = provider
            .embed(&inputs(&["one"]), &CancelToken::new())
            .unwrap();
        assert_eq!(results[0], vec![1.5, 0.0, 2.5]);
    }

    #[test]
    fn null_row_becomes_empty_vector() {
        // A null row still counts toward the batch length.
        let transport = ScriptedTransport::new(vec![ScriptedTransport::json_ok(
            &serde_json::json!({ "embeddings": [null, [1.0]] }),
        )]);
        let provider = provider(transport, 8);

        let results = provider
            .embed(&inputs(&["one", "two"]), &CancelToken::new())
            .unwrap();
        assert_eq!(results[0], Vec::<f32>::new());
        assert_eq!(results[1], vec![1.0]);
    }

    #[test]
    fn non_200_fails_with_status_and_body() {
        let transport = ScriptedTransport::new(vec![Ok(HttpResult {
            status: 503,
            body: b"overloaded".to_vec(),
        })]);
        let provider = provider(transport, 8);

        let err = provider
            .embed(&inputs(&["one"]), &CancelToken::new())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("503"), "missing status: {message}");
        assert!(message.contains("overloaded"), "missing body: {message}");
    }

    #[test]
    fn missing_embeddings_list_fails() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::json_ok(
            &serde_json::json!({ "detail": "model not loaded" }),
        )]);
        let provider = provider(transport, 8);

        let err = provider
            .embed(&inputs(&["one"]), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(msg) if msg.contains("missing embeddings")));
    }

    #[test]
    fn size_mismatch_fails_with_counts() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::json_ok(
            &serde_json::json!({ "embeddings": [[1.0]] }),
        )]);
        let provider = provider(transport, 8);

        let err = provider
            .embed(&inputs(&["one", "two"]), &CancelToken::new())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("expected 2"), "{message}");
        assert!(message.contains("got 1"), "{message}");
    }

    #[test]
    fn late_batch_failure_discards_earlier_results() {
        // First batch succeeds, second comes back short.
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::json_ok(&serde_json::json!({ "embeddings": [[1.0], [2.0]] })),
            ScriptedTransport::json_ok(&serde_json::json!({ "embeddings": [] })),
        ]);
        let provider = provider(transport, 2);

        let err = provider
            .embed(&inputs(&["one", "two", "three"]), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[test]
    fn transport_failure_is_wrapped() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Io(
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
        ))]);
        let provider = provider(transport, 8);

        let err = provider
            .embed(&inputs(&["one"]), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(msg) if msg.contains("connection refused")));
    }

    #[test]
    fn cancellation_fails_the_call_and_stays_observable() {
        let transport = ScriptedTransport::new(vec![]);
        let provider = provider(transport, 8);
        let token = CancelToken::new();
        token.cancel();

        let err = provider.embed(&inputs(&["one"]), &token).unwrap_err();
        assert!(matches!(err, Error::Embedding(msg) if msg.contains("cancelled")));
        assert!(token.is_cancelled());
    }

    #[test]
    fn construction_rejects_blank_base_url() {
        // The provider is not Debug, so inspect the Err side directly.
        let err = LocalHttpProvider::new("   ").err().unwrap();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn construction_rejects_zero_batch_size() {
        let err = LocalHttpProvider::with_transport(
            RecordingTransport::default(),
            "http://localhost:8088",
            0,
            Duration::from_secs(5),
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::InvalidArgument(msg) if msg.contains("batch_size")));
    }

    #[test]
    fn endpoint_url_tolerates_trailing_slash() {
        assert_eq!(
            endpoint_url("http://localhost:8088/", "embed").unwrap(),
            "http://localhost:8088/embed"
        );
        assert_eq!(
            endpoint_url("http://localhost:8088", "embed").unwrap(),
            "http://localhost:8088/embed"
        );
    }
}

//! Embedding generation against the local embedding server.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  indexing pipeline  │            ┌──────────────────┐
//! │   (embed traffic)   │            │  repomind doctor │
//! └─────────┬───────────┘            └────────┬─────────┘
//!           ▼                                 ▼
//! ┌───────────────────┐          ┌───────────────────────┐
//! │ LocalHttpProvider │          │ EmbeddingServerClient │
//! │  POST /embed      │          │  GET /health          │
//! └─────────┬─────────┘          └──────────┬────────────┘
//!           └──────────────┬────────────────┘
//!                          ▼
//!                 ┌─────────────────┐
//!                 │  HttpTransport  │  ← blocking, timeout, CancelToken
//!                 └─────────────────┘
//! ```
//!
//! The provider and the health client share the [`transport`] seam but
//! fail differently on purpose: embedding failures abort an indexing run,
//! while an unreachable server is a normal diagnostic answer.

pub mod health;
pub mod local_http;
pub mod provider;
pub mod transport;

// Re-exports for convenience
pub use health::EmbeddingServerClient;
pub use local_http::LocalHttpProvider;
pub use provider::EmbeddingProvider;
pub use transport::{CancelToken, HttpResult, HttpTransport, ReqwestTransport, TransportError};

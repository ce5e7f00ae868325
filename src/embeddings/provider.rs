//! Embedding provider trait.
//!
//! Defines the interface between the indexing pipeline and whatever
//! service turns text into vectors. Calls are blocking; cancellation is
//! cooperative via the token.

use crate::embeddings::transport::CancelToken;
use crate::error::Result;

/// Converts batches of text into vectors.
///
/// The trait is object-safe so the pipeline can select a provider at
/// runtime from configuration.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed every input, returning one vector per input in the same
    /// order. An empty input slice yields an empty result without any
    /// network activity.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Embedding`] if any batch fails; partial
    /// results are never returned.
    fn embed(&self, inputs: &[String], cancel: &CancelToken) -> Result<Vec<Vec<f32>>>;
}

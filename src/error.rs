//! Crate-wide error taxonomy
//!
//! Every engine operation fails with one of these kinds, so callers can
//! branch on the status. All variants except `Unavailable` are
//! deterministic rejections; retrying them without changing the request
//! will fail the same way. `Unavailable` means the store stayed
//! unreachable after the repository layer exhausted its retries.

use crate::graph::{ArtifactKey, NodeKey, TagKey};
use crate::storage::StorageError;
use thiserror::Error;

/// Errors surfaced by the consistency engine and the API layer.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("knowledge node not found: {0}")]
    NodeNotFound(NodeKey),

    #[error("edge not found: {0}")]
    EdgeNotFound(String),

    #[error("tag not found: {0}")]
    TagNotFound(TagKey),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(ArtifactKey),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("authorization required")]
    Unauthorized,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for engine and API operations.
pub type GraphResult<T> = Result<T, GraphError>;

impl From<StorageError> for GraphError {
    /// Storage failures that escape the repository retry layer are not part
    /// of the caller-visible taxonomy; they collapse into `Unavailable`.
    fn from(err: StorageError) -> Self {
        GraphError::Unavailable(err.to_string())
    }
}

//! Per-entity repositories over the entity store
//!
//! Repositories are thin: they own id allocation, the retry policy for
//! transient store faults, and single-entity validation. Anything that
//! spans entities (existence of referenced nodes, cascades) belongs to the
//! consistency engine, not here.

mod artifact;
mod edge;
mod node;
mod tag;

pub use artifact::ArtifactRepository;
pub use edge::EdgeRepository;
pub use node::NodeRepository;
pub use tag::TagRepository;

use crate::storage::StorageResult;
use std::future::Future;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_millis(20);

/// Retry a store call on transient faults with exponential backoff.
///
/// Retries are invisible to callers: either the call eventually succeeds,
/// or the last error comes back once attempts are exhausted.
pub(crate) async fn with_retry<T, F, Fut>(op: F) -> StorageResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = StorageResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(err) if err.is_transient() && attempt + 1 < MAX_ATTEMPTS => {
                attempt += 1;
                let backoff = BACKOFF_BASE * 2u32.pow(attempt - 1);
                tracing::warn!(attempt, error = %err, "transient store fault, retrying");
                tokio::time::sleep(backoff).await;
            }
            other => return other,
        }
    }
}

/// Result of a best-effort bulk delete.
///
/// `failed > 0` or `deadline_hit` means orphans remain; they are
/// discoverable by the same index scans that produced the batch, so a
/// repair pass can finish the job.
#[derive(Debug, Clone, Copy, Default)]
pub struct PurgeOutcome {
    /// Records confirmed gone (including ones already deleted).
    pub removed: usize,
    /// Records whose delete kept failing.
    pub failed: usize,
    /// Whether the purge stopped early on an expired deadline.
    pub deadline_hit: bool,
}

impl PurgeOutcome {
    /// Whether every record in the batch is confirmed gone.
    pub fn complete(&self) -> bool {
        self.failed == 0 && !self.deadline_hit
    }
}

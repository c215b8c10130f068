//! Ownership guard: the seam to the external authorization collaborator
//!
//! Identity resolution and role storage live outside this crate; the
//! engine only ever asks one question, through this trait. The guard is
//! constructed once at startup and passed by handle, never looked up
//! through a global registry.

use crate::error::{GraphError, GraphResult};
use async_trait::async_trait;

/// Decides whether an acting principal may mutate an entity recorded as
/// owned by `owner`.
#[async_trait]
pub trait OwnershipGuard: Send + Sync {
    /// `Err(Forbidden)` unless `principal` may mutate the entity.
    async fn ensure_owner(&self, owner: &str, principal: &str) -> GraphResult<()>;
}

/// Default policy: only the recorded creator may mutate.
#[derive(Debug, Default)]
pub struct CreatorOnly;

#[async_trait]
impl OwnershipGuard for CreatorOnly {
    async fn ensure_owner(&self, owner: &str, principal: &str) -> GraphResult<()> {
        if owner == principal {
            Ok(())
        } else {
            Err(GraphError::Forbidden(
                "only the owner can modify this entity".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creator_passes_everyone_else_fails() {
        let guard = CreatorOnly;
        assert!(guard.ensure_owner("u1", "u1").await.is_ok());
        assert!(matches!(
            guard.ensure_owner("u1", "u2").await,
            Err(GraphError::Forbidden(_))
        ));
    }
}

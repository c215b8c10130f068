//! Tag repository: associations between artifacts and nodes

use super::{with_retry, PurgeOutcome};
use crate::deadline::Deadline;
use crate::error::{GraphError, GraphResult};
use crate::graph::{ArtifactKey, NodeKey, Tag, TagKey};
use crate::storage::{EntityStore, StorageError, TagInsert};
use std::sync::Arc;
use tracing::warn;

/// Mirrors the edge repository shape. Pair uniqueness on
/// (artifact, node) is enforced by the store's unique index, first
/// writer wins.
pub struct TagRepository {
    store: Arc<dyn EntityStore>,
}

impl TagRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Create the tag, or return the stored one when the pair is already
    /// bound.
    pub async fn create(
        &self,
        owner: &str,
        artifact: &ArtifactKey,
        node: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Tag> {
        deadline.check()?;
        let id = with_retry(|| self.store.allocate_id()).await?;
        let tag = Tag::new(TagKey::from_id(&id), owner, artifact.clone(), node.clone());
        deadline.check()?;
        match with_retry(|| self.store.insert_tag(&tag)).await? {
            TagInsert::Created(tag) => Ok(tag),
            TagInsert::Existing(tag) => Ok(tag),
        }
    }

    pub async fn get(&self, key: &TagKey, deadline: &Deadline) -> GraphResult<Tag> {
        deadline.check()?;
        with_retry(|| self.store.get_tag(key))
            .await?
            .ok_or_else(|| GraphError::TagNotFound(key.clone()))
    }

    /// Re-point an existing tag at a new (artifact, node) pair, keeping
    /// its strength. Rebinding onto a pair another tag holds is a
    /// conflict.
    pub async fn rebind(
        &self,
        key: &TagKey,
        artifact: &ArtifactKey,
        node: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Tag> {
        let mut tag = self.get(key, deadline).await?;
        tag.rebind(artifact.clone(), node.clone());
        deadline.check()?;
        match with_retry(|| self.store.put_tag(&tag)).await {
            Ok(()) => Ok(tag),
            Err(StorageError::Constraint(msg)) => Err(GraphError::Conflict(msg)),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_by_artifact(
        &self,
        key: &ArtifactKey,
        limit: usize,
        deadline: &Deadline,
    ) -> GraphResult<Vec<Tag>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.tags_by_artifact(key, limit)).await?)
    }

    pub async fn find_by_node(
        &self,
        key: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Vec<Tag>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.tags_by_node(key)).await?)
    }

    pub async fn find_by_pair(
        &self,
        artifact: &ArtifactKey,
        node: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Option<Tag>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.tag_by_pair(artifact, node)).await?)
    }

    /// Delete one tag record. Returns whether a record existed.
    pub async fn delete(&self, key: &TagKey, deadline: &Deadline) -> GraphResult<bool> {
        deadline.check()?;
        Ok(with_retry(|| self.store.delete_tag(key)).await?)
    }

    pub async fn list(&self, limit: usize, deadline: &Deadline) -> GraphResult<Vec<Tag>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.list_tags(limit)).await?)
    }

    /// Best-effort bulk delete; same contract as the edge repository.
    pub async fn delete_many(&self, tags: &[Tag], deadline: &Deadline) -> PurgeOutcome {
        let mut outcome = PurgeOutcome::default();
        for tag in tags {
            if deadline.expired() {
                outcome.deadline_hit = true;
                break;
            }
            match with_retry(|| self.store.delete_tag(&tag.key)).await {
                Ok(_) => outcome.removed += 1,
                Err(err) => {
                    warn!(tag = %tag.key, error = %err, "tag delete failed, leaving orphan for repair");
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }
}

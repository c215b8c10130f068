//! Edge repository: CRUD for directed edges between nodes

use super::{with_retry, PurgeOutcome};
use crate::deadline::Deadline;
use crate::error::{GraphError, GraphResult};
use crate::graph::{Edge, EdgeKey, NodeKey};
use crate::storage::{EdgeInsert, EntityStore};
use std::sync::Arc;
use tracing::warn;

/// Owns duplicate and self-loop prevention for edges. Whether the
/// endpoints exist is checked by the engine before anything reaches
/// `create`; the unique pair index underneath is the final authority on
/// duplicates.
pub struct EdgeRepository {
    store: Arc<dyn EntityStore>,
}

impl EdgeRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Create the edge, or return the stored one when another writer got
    /// there first. The one structural check here is the self-loop guard.
    pub async fn create(
        &self,
        owner: &str,
        parent: &NodeKey,
        child: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Edge> {
        if parent == child {
            return Err(GraphError::Conflict(format!(
                "edge endpoints must differ: {parent}"
            )));
        }
        deadline.check()?;
        let id = with_retry(|| self.store.allocate_id()).await?;
        let edge = Edge::new(EdgeKey::from_id(&id), owner, parent.clone(), child.clone());
        deadline.check()?;
        match with_retry(|| self.store.insert_edge(&edge)).await? {
            EdgeInsert::Created(edge) => Ok(edge),
            EdgeInsert::Existing(edge) => Ok(edge),
        }
    }

    pub async fn find_by_parent(
        &self,
        key: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Vec<Edge>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.edges_by_parent(key)).await?)
    }

    pub async fn find_by_child(
        &self,
        key: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Vec<Edge>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.edges_by_child(key)).await?)
    }

    pub async fn find_by_endpoints(
        &self,
        parent: &NodeKey,
        child: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Option<Edge>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.edge_by_endpoints(parent, child)).await?)
    }

    /// Delete one edge record. Returns whether a record existed.
    pub async fn delete(&self, key: &EdgeKey, deadline: &Deadline) -> GraphResult<bool> {
        deadline.check()?;
        Ok(with_retry(|| self.store.delete_edge(key)).await?)
    }

    /// Best-effort bulk delete, at-least-once per record.
    ///
    /// A record that is already gone counts as removed. Failures are
    /// logged and counted, never raised: partial failure leaves orphan
    /// edges that the same index scans will find again, so the operation
    /// is retryable as a whole.
    pub async fn delete_many(&self, edges: &[Edge], deadline: &Deadline) -> PurgeOutcome {
        let mut outcome = PurgeOutcome::default();
        for edge in edges {
            if deadline.expired() {
                outcome.deadline_hit = true;
                break;
            }
            match with_retry(|| self.store.delete_edge(&edge.key)).await {
                Ok(_) => outcome.removed += 1,
                Err(err) => {
                    warn!(edge = %edge.key, error = %err, "edge delete failed, leaving orphan for repair");
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }

    pub async fn list(&self, limit: usize, deadline: &Deadline) -> GraphResult<Vec<Edge>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.list_edges(limit)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn repo() -> EdgeRepository {
        EdgeRepository::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn self_loop_is_rejected_without_a_write() {
        let repo = repo();
        let key = NodeKey::from_id("a");
        let result = repo.create("u1", &key, &key, &Deadline::none()).await;
        assert!(matches!(result, Err(GraphError::Conflict(_))));
        assert!(repo.list(10, &Deadline::none()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_create_returns_the_first_edge() {
        let repo = repo();
        let parent = NodeKey::from_id("p");
        let child = NodeKey::from_id("c");

        let first = repo
            .create("u1", &parent, &child, &Deadline::none())
            .await
            .unwrap();
        let second = repo
            .create("u2", &parent, &child, &Deadline::none())
            .await
            .unwrap();

        assert_eq!(second.key, first.key);
        assert_eq!(second.created_by, "u1");
        assert_eq!(repo.list(10, &Deadline::none()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_many_counts_missing_records_as_removed() {
        let repo = repo();
        let edge = repo
            .create(
                "u1",
                &NodeKey::from_id("p"),
                &NodeKey::from_id("c"),
                &Deadline::none(),
            )
            .await
            .unwrap();

        let outcome = repo
            .delete_many(&[edge.clone(), edge.clone()], &Deadline::none())
            .await;
        assert_eq!(outcome.removed, 2);
        assert_eq!(outcome.failed, 0);
        assert!(outcome.complete());
    }

    #[tokio::test]
    async fn delete_many_stops_on_expired_deadline() {
        let repo = repo();
        let mut edges = Vec::new();
        for i in 0..4 {
            edges.push(
                repo.create(
                    "u1",
                    &NodeKey::from_id(format!("p{i}")),
                    &NodeKey::from_id("c"),
                    &Deadline::none(),
                )
                .await
                .unwrap(),
            );
        }

        let outcome = repo
            .delete_many(&edges, &Deadline::after(std::time::Duration::ZERO))
            .await;
        assert!(outcome.deadline_hit);
        assert_eq!(outcome.removed, 0);
        assert!(!outcome.complete());
    }
}

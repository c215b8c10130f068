//! Node repository: CRUD for knowledge nodes

use super::with_retry;
use crate::auth::OwnershipGuard;
use crate::deadline::Deadline;
use crate::error::{GraphError, GraphResult};
use crate::graph::{KnowledgeNode, NodeKey};
use crate::storage::EntityStore;
use std::sync::Arc;

/// Owns node identity and single-node mutation. Deletion here removes the
/// node record only; cascading dependent edges and tags is the engine's
/// responsibility.
pub struct NodeRepository {
    store: Arc<dyn EntityStore>,
    guard: Arc<dyn OwnershipGuard>,
}

impl NodeRepository {
    pub fn new(store: Arc<dyn EntityStore>, guard: Arc<dyn OwnershipGuard>) -> Self {
        Self { store, guard }
    }

    /// Create a node owned by `owner`. The id comes from the store's
    /// allocation primitive.
    pub async fn create(
        &self,
        owner: &str,
        name: &str,
        description: &str,
        deadline: &Deadline,
    ) -> GraphResult<KnowledgeNode> {
        deadline.check()?;
        let id = with_retry(|| self.store.allocate_id()).await?;
        let node = KnowledgeNode::new(NodeKey::from_id(&id), owner, name, description);
        deadline.check()?;
        with_retry(|| self.store.put_node(&node)).await?;
        Ok(node)
    }

    /// Load a node or fail with `NodeNotFound`.
    pub async fn get(&self, key: &NodeKey, deadline: &Deadline) -> GraphResult<KnowledgeNode> {
        self.try_get(key, deadline)
            .await?
            .ok_or_else(|| GraphError::NodeNotFound(key.clone()))
    }

    /// Load a node, `None` when absent. Used where a missing node is a
    /// normal outcome (dangling-reference filtering), not an error.
    pub async fn try_get(
        &self,
        key: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Option<KnowledgeNode>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.get_node(key)).await?)
    }

    /// Update name/description. Only the owner may update.
    pub async fn update(
        &self,
        owner: &str,
        key: &NodeKey,
        name: &str,
        description: &str,
        deadline: &Deadline,
    ) -> GraphResult<KnowledgeNode> {
        let mut node = self.get(key, deadline).await?;
        self.guard.ensure_owner(&node.created_by, owner).await?;
        node.update(name, description);
        deadline.check()?;
        with_retry(|| self.store.put_node(&node)).await?;
        Ok(node)
    }

    /// Physically delete the node record. Only the owner may delete.
    pub async fn delete(
        &self,
        owner: &str,
        key: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<()> {
        let node = self.get(key, deadline).await?;
        self.guard.ensure_owner(&node.created_by, owner).await?;
        deadline.check()?;
        let removed = with_retry(|| self.store.delete_node(key)).await?;
        if removed {
            Ok(())
        } else {
            // Lost a race with another deleter; the node is gone either way.
            Err(GraphError::NodeNotFound(key.clone()))
        }
    }

    pub async fn list_by_owner(
        &self,
        owner: &str,
        limit: usize,
        deadline: &Deadline,
    ) -> GraphResult<Vec<KnowledgeNode>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.nodes_by_owner(owner, limit)).await?)
    }

    pub async fn list(&self, limit: usize, deadline: &Deadline) -> GraphResult<Vec<KnowledgeNode>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.list_nodes(limit)).await?)
    }
}

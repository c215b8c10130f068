//! Graph consistency engine
//!
//! The one place where operations span more than one entity. The store
//! only guarantees atomicity per record, so every multi-entity operation
//! here is a bounded sequence of steps designed for partial failure:
//! consistency checks run first and abort the whole operation, the
//! primary entity change is a single atomic write, and anything after it
//! is best-effort cleanup that a repair sweep can finish later.

mod sweep;

pub use sweep::SweepReport;

use crate::auth::OwnershipGuard;
use crate::deadline::Deadline;
use crate::error::{GraphError, GraphResult};
use crate::graph::{ArtifactKey, Edge, KnowledgeNode, NodeKey, Tag, TagKey};
use crate::repo::{ArtifactRepository, EdgeRepository, NodeRepository, TagRepository};
use crate::storage::EntityStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a node deletion.
///
/// The node itself is gone whenever this struct exists. `cleanup_pending`
/// reports that some incident edges or tags could not be confirmed
/// deleted; they are dangling references, invisible to readers and
/// removable by [`GraphEngine::sweep`].
#[derive(Debug, Clone)]
pub struct CascadeReport {
    pub node_key: NodeKey,
    pub edges_removed: usize,
    pub tags_removed: usize,
    pub cleanup_pending: bool,
}

/// Orchestrates multi-entity operations across the repositories.
///
/// Holds no locks and caches nothing across calls; every operation
/// re-reads current state. Construct one at startup and share it by
/// handle.
pub struct GraphEngine {
    nodes: NodeRepository,
    edges: EdgeRepository,
    tags: TagRepository,
    artifacts: ArtifactRepository,
    guard: Arc<dyn OwnershipGuard>,
}

impl GraphEngine {
    /// Wire the engine to a store and an ownership guard.
    pub fn new(store: Arc<dyn EntityStore>, guard: Arc<dyn OwnershipGuard>) -> Self {
        Self {
            nodes: NodeRepository::new(store.clone(), guard.clone()),
            edges: EdgeRepository::new(store.clone()),
            tags: TagRepository::new(store.clone()),
            artifacts: ArtifactRepository::new(store, guard.clone()),
            guard,
        }
    }

    /// Single-node CRUD; no cross-entity checks involved.
    pub fn nodes(&self) -> &NodeRepository {
        &self.nodes
    }

    /// Artifact lifecycle (create/update/expire); soft-delete only.
    pub fn artifacts(&self) -> &ArtifactRepository {
        &self.artifacts
    }

    // === Edges ===

    /// Create an edge after validating both endpoints.
    ///
    /// The existence and duplicate checks are reads against an
    /// eventually-consistent index; the unique pair index at write time is
    /// the final authority. When two identical creates race, the loser
    /// gets the winner's edge back rather than an error or a duplicate.
    pub async fn create_edge(
        &self,
        owner: &str,
        parent: &NodeKey,
        child: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Edge> {
        if parent == child {
            debug!(node = %parent, "rejecting self-loop edge");
            return Err(GraphError::Forbidden(
                "cannot create an edge from a node to itself".to_string(),
            ));
        }
        self.nodes.get(parent, deadline).await?;
        self.nodes.get(child, deadline).await?;
        if self
            .edges
            .find_by_endpoints(parent, child, deadline)
            .await?
            .is_some()
        {
            return Err(GraphError::Conflict(format!(
                "edge already exists: {parent} -> {child}"
            )));
        }
        self.edges.create(owner, parent, child, deadline).await
    }

    /// Delete the edge identified by its endpoint pair.
    pub async fn delete_edge(
        &self,
        owner: &str,
        parent: &NodeKey,
        child: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<()> {
        let edge = self
            .edges
            .find_by_endpoints(parent, child, deadline)
            .await?
            .ok_or_else(|| GraphError::EdgeNotFound(format!("{parent} -> {child}")))?;
        self.guard.ensure_owner(&edge.created_by, owner).await?;
        if self.edges.delete(&edge.key, deadline).await? {
            Ok(())
        } else {
            Err(GraphError::EdgeNotFound(format!("{parent} -> {child}")))
        }
    }

    /// All edges, bounded by `limit`, with dangling entries filtered.
    ///
    /// An edge whose endpoint node is gone is a leftover from an
    /// interrupted cascade; readers see it as already deleted.
    pub async fn list_edges(&self, limit: usize, deadline: &Deadline) -> GraphResult<Vec<Edge>> {
        let raw = self.edges.list(limit, deadline).await?;
        let mut live = Vec::with_capacity(raw.len());
        for edge in raw {
            if self.node_exists(&edge.parent_key, deadline).await?
                && self.node_exists(&edge.child_key, deadline).await?
            {
                live.push(edge);
            }
        }
        Ok(live)
    }

    // === Nodes ===

    /// Delete a node and cascade to everything referencing it.
    ///
    /// The node record is deleted *before* the dependents: once it is
    /// gone, no concurrent `create_edge`/`create_tag` can validate a
    /// reference to it, so the cascade is cleanup of invisible leftovers
    /// rather than a prerequisite. A failure or deadline expiry during
    /// the cascade therefore reports success with `cleanup_pending`
    /// instead of failing an operation whose primary effect already
    /// committed.
    pub async fn delete_node(
        &self,
        owner: &str,
        key: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<CascadeReport> {
        let node = self.nodes.get(key, deadline).await?;
        self.guard.ensure_owner(&node.created_by, owner).await?;

        // Two index scans, concatenated, deduplicated by edge identity.
        let mut incident = self.edges.find_by_parent(key, deadline).await?;
        incident.extend(self.edges.find_by_child(key, deadline).await?);
        let mut seen = HashSet::new();
        incident.retain(|edge| seen.insert(edge.key.clone()));

        let node_tags = self.tags.find_by_node(key, deadline).await?;

        // Primary write; all-or-nothing. From here on the operation
        // cannot fail, only degrade to cleanup_pending.
        self.nodes.delete(owner, key, deadline).await?;

        let edge_purge = self.edges.delete_many(&incident, deadline).await;
        let tag_purge = self.tags.delete_many(&node_tags, deadline).await;
        let cleanup_pending = !edge_purge.complete() || !tag_purge.complete();

        if cleanup_pending {
            warn!(
                node = %key,
                edges_failed = edge_purge.failed,
                tags_failed = tag_purge.failed,
                deadline_hit = edge_purge.deadline_hit || tag_purge.deadline_hit,
                "node deleted but cascade incomplete, sweep will finish"
            );
        } else {
            info!(
                node = %key,
                edges = edge_purge.removed,
                tags = tag_purge.removed,
                "node deleted with full cascade"
            );
        }

        Ok(CascadeReport {
            node_key: key.clone(),
            edges_removed: edge_purge.removed,
            tags_removed: tag_purge.removed,
            cleanup_pending,
        })
    }

    // === Tags ===

    /// Create a tag after validating the artifact and node exist.
    ///
    /// Duplicate pairs are idempotent: the existing tag comes back.
    /// An expired artifact is still a valid tag target; expiry is a
    /// status, not an absence.
    pub async fn create_tag(
        &self,
        owner: &str,
        artifact: &ArtifactKey,
        node: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Tag> {
        if !self.artifacts.exists(artifact, deadline).await? {
            return Err(GraphError::ArtifactNotFound(artifact.clone()));
        }
        self.nodes.get(node, deadline).await?;
        if let Some(existing) = self.tags.find_by_pair(artifact, node, deadline).await? {
            return Ok(existing);
        }
        self.tags.create(owner, artifact, node, deadline).await
    }

    /// Re-point an existing tag; strength is preserved. The new endpoints
    /// are validated the same way as at creation.
    pub async fn rebind_tag(
        &self,
        owner: &str,
        key: &TagKey,
        artifact: &ArtifactKey,
        node: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Tag> {
        let tag = self.tags.get(key, deadline).await?;
        self.guard.ensure_owner(&tag.created_by, owner).await?;
        if !self.artifacts.exists(artifact, deadline).await? {
            return Err(GraphError::ArtifactNotFound(artifact.clone()));
        }
        self.nodes.get(node, deadline).await?;
        self.tags.rebind(key, artifact, node, deadline).await
    }

    /// Delete a tag by identity; same shape as [`Self::delete_edge`].
    pub async fn delete_tag(
        &self,
        owner: &str,
        key: &TagKey,
        deadline: &Deadline,
    ) -> GraphResult<()> {
        let tag = self.tags.get(key, deadline).await?;
        self.guard.ensure_owner(&tag.created_by, owner).await?;
        if self.tags.delete(key, deadline).await? {
            Ok(())
        } else {
            Err(GraphError::TagNotFound(key.clone()))
        }
    }

    /// Tags for an artifact, with dangling node references filtered.
    pub async fn tags_by_artifact(
        &self,
        artifact: &ArtifactKey,
        limit: usize,
        deadline: &Deadline,
    ) -> GraphResult<Vec<Tag>> {
        let raw = self.tags.find_by_artifact(artifact, limit, deadline).await?;
        let mut live = Vec::with_capacity(raw.len());
        for tag in raw {
            if self.node_exists(&tag.node_key, deadline).await? {
                live.push(tag);
            }
        }
        Ok(live)
    }

    /// Tags for a node. A missing node has no visible tags, whatever
    /// orphan records an interrupted cascade may have left.
    pub async fn tags_by_node(
        &self,
        node: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<Vec<Tag>> {
        if !self.node_exists(node, deadline).await? {
            return Ok(Vec::new());
        }
        self.tags.find_by_node(node, deadline).await
    }

    async fn node_exists(&self, key: &NodeKey, deadline: &Deadline) -> GraphResult<bool> {
        Ok(self.nodes.try_get(key, deadline).await?.is_some())
    }

    // === Reads ===

    pub async fn get_node(&self, key: &NodeKey, deadline: &Deadline) -> GraphResult<KnowledgeNode> {
        self.nodes.get(key, deadline).await
    }

    pub async fn list_nodes(
        &self,
        limit: usize,
        deadline: &Deadline,
    ) -> GraphResult<Vec<KnowledgeNode>> {
        self.nodes.list(limit, deadline).await
    }

    pub async fn list_nodes_by_owner(
        &self,
        owner: &str,
        limit: usize,
        deadline: &Deadline,
    ) -> GraphResult<Vec<KnowledgeNode>> {
        self.nodes.list_by_owner(owner, limit, deadline).await
    }
}

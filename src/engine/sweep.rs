//! Repair sweep for dangling references
//!
//! A crash or deadline expiry between a node's primary delete and its
//! cascade leaves orphan edges/tags behind. Readers already treat those
//! as deleted; this pass makes it physical. The original system deferred
//! this cleanup to a task queue; here it is an explicit, re-runnable
//! engine operation.

use super::GraphEngine;
use crate::deadline::Deadline;
use crate::error::{GraphError, GraphResult};
use crate::graph::{ArtifactKey, NodeKey};
use std::collections::HashMap;
use tracing::{debug, info};

/// What a sweep pass did.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepReport {
    pub edges_scanned: usize,
    pub edges_removed: usize,
    pub tags_scanned: usize,
    pub tags_removed: usize,
    /// Whether the pass stopped early on an expired deadline.
    pub deadline_hit: bool,
}

impl GraphEngine {
    /// Remove orphan edges and tags whose endpoints no longer resolve.
    ///
    /// Idempotent and safe to re-run at any time: it deletes exactly the
    /// records readers already see as deleted. Each scan is bounded by
    /// `limit`; run repeatedly to drain a large backlog. An artifact
    /// endpoint only counts as missing when its record is gone entirely —
    /// `Expired` is a status, not an absence.
    pub async fn sweep(&self, limit: usize, deadline: &Deadline) -> GraphResult<SweepReport> {
        let mut report = SweepReport::default();
        match self.sweep_pass(limit, deadline, &mut report).await {
            Ok(()) => Ok(report),
            // Expiry anywhere in the pass is a partial success; the next
            // sweep picks up where this one stopped.
            Err(GraphError::DeadlineExceeded) => {
                report.deadline_hit = true;
                Ok(report)
            }
            Err(err) => Err(err),
        }
    }

    async fn sweep_pass(
        &self,
        limit: usize,
        deadline: &Deadline,
        report: &mut SweepReport,
    ) -> GraphResult<()> {
        // Endpoint existence memoized for the duration of this pass only.
        let mut known: HashMap<String, bool> = HashMap::new();

        let edges = self.edges.list(limit, deadline).await?;
        report.edges_scanned = edges.len();
        for edge in &edges {
            let live = self.known_node(&mut known, &edge.parent_key, deadline).await?
                && self.known_node(&mut known, &edge.child_key, deadline).await?;
            if !live {
                debug!(edge = %edge.key, "sweeping dangling edge");
                if self.edges.delete(&edge.key, deadline).await? {
                    report.edges_removed += 1;
                }
            }
        }

        let tags = self.tags.list(limit, deadline).await?;
        report.tags_scanned = tags.len();
        for tag in &tags {
            let live = self.known_node(&mut known, &tag.node_key, deadline).await?
                && self
                    .known_artifact(&mut known, &tag.artifact_key, deadline)
                    .await?;
            if !live {
                debug!(tag = %tag.key, "sweeping dangling tag");
                if self.tags.delete(&tag.key, deadline).await? {
                    report.tags_removed += 1;
                }
            }
        }

        if report.edges_removed > 0 || report.tags_removed > 0 {
            info!(
                edges = report.edges_removed,
                tags = report.tags_removed,
                "sweep removed dangling records"
            );
        }
        Ok(())
    }

    async fn known_node(
        &self,
        known: &mut HashMap<String, bool>,
        key: &NodeKey,
        deadline: &Deadline,
    ) -> GraphResult<bool> {
        if let Some(&live) = known.get(key.as_str()) {
            return Ok(live);
        }
        let live = self.nodes.try_get(key, deadline).await?.is_some();
        known.insert(key.as_str().to_string(), live);
        Ok(live)
    }

    async fn known_artifact(
        &self,
        known: &mut HashMap<String, bool>,
        key: &ArtifactKey,
        deadline: &Deadline,
    ) -> GraphResult<bool> {
        if let Some(&live) = known.get(key.as_str()) {
            return Ok(live);
        }
        let live = self.artifacts.exists(key, deadline).await?;
        known.insert(key.as_str().to_string(), live);
        Ok(live)
    }
}

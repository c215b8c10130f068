//! Edge: a directed, weighted dependency between two knowledge nodes

use super::node::NodeKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default dependency weight for a freshly created edge or tag.
pub const DEFAULT_STRENGTH: f64 = 1.0;

/// Opaque reference to an edge record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeKey(String);

impl EdgeKey {
    /// Build a key from a store-allocated raw id.
    pub fn from_id(id: impl AsRef<str>) -> Self {
        Self(format!("edge:{}", id.as_ref()))
    }

    /// Wrap an existing reference string.
    pub fn from_string(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the inner reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EdgeKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A directed edge from a parent node to a child node.
///
/// `strength` expresses how strongly the parent depends on the child.
/// Invariants (enforced by the engine and the store, not by this type):
/// the two endpoints differ, and at most one edge exists per ordered
/// (parent, child) pair. The reverse edge is a distinct pair and is
/// permitted; the graph is not required to be acyclic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique reference
    pub key: EdgeKey,
    /// The depending node
    pub parent_key: NodeKey,
    /// The node being depended on
    pub child_key: NodeKey,
    /// Dependency weight, defaults to [`DEFAULT_STRENGTH`]
    pub strength: f64,
    /// User id of the owner
    pub created_by: String,
    /// When the edge was created
    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// Create a new edge with the default strength.
    pub fn new(
        key: EdgeKey,
        created_by: impl Into<String>,
        parent_key: NodeKey,
        child_key: NodeKey,
    ) -> Self {
        Self {
            key,
            parent_key,
            child_key,
            strength: DEFAULT_STRENGTH,
            created_by: created_by.into(),
            created_at: Utc::now(),
        }
    }

    /// Whether this edge touches the given node on either end.
    pub fn touches(&self, node: &NodeKey) -> bool {
        &self.parent_key == node || &self.child_key == node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_edge_has_default_strength() {
        let edge = Edge::new(
            EdgeKey::from_id("1"),
            "u1",
            NodeKey::from_id("p"),
            NodeKey::from_id("c"),
        );
        assert_eq!(edge.strength, DEFAULT_STRENGTH);
    }

    #[test]
    fn touches_matches_either_endpoint() {
        let parent = NodeKey::from_id("p");
        let child = NodeKey::from_id("c");
        let edge = Edge::new(EdgeKey::from_id("1"), "u1", parent.clone(), child.clone());
        assert!(edge.touches(&parent));
        assert!(edge.touches(&child));
        assert!(!edge.touches(&NodeKey::from_id("other")));
    }
}

//! Knowledge node: a unit of knowledge in the graph

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque reference to a knowledge node.
///
/// Serializes as a plain string of the form `node:<id>`, where `<id>` is
/// whatever the store's id-allocation primitive produced. The engine never
/// interprets the inner id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    /// Build a key from a store-allocated raw id.
    pub fn from_id(id: impl AsRef<str>) -> Self {
        Self(format!("node:{}", id.as_ref()))
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

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A node in the knowledge graph.
///
/// Adjacency is not stored on the node: edges are standalone records found
/// by index scan, so concurrent edge mutations never read-modify-write the
/// node record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeNode {
    /// Unique reference
    pub key: NodeKey,
    /// Human-readable name
    pub name: String,
    /// Longer description of what this node covers
    pub description: String,
    /// User id of the owner
    pub created_by: String,
    /// When the node was created
    pub created_at: DateTime<Utc>,
    /// When name/description were last changed
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeNode {
    /// Create a new node owned by `created_by`.
    pub fn new(
        key: NodeKey,
        created_by: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            key,
            name: name.into(),
            description: description.into(),
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update to the mutable fields.
    pub fn update(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.name = name.into();
        self.description = description.into();
        self.updated_at = Utc::now();
    }
}

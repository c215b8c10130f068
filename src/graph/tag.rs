//! Tag: a weighted association between a learning artifact and a node

use super::artifact::ArtifactKey;
use super::edge::DEFAULT_STRENGTH;
use super::node::NodeKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque reference to a tag record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagKey(String);

impl TagKey {
    pub fn from_id(id: impl AsRef<str>) -> Self {
        Self(format!("tag:{}", id.as_ref()))
    }

    pub fn from_string(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TagKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TagKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Links a quiz or question to the node it exercises.
///
/// Strength is set at creation and never edited; an update re-points the
/// artifact/node references and keeps the recorded strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub key: TagKey,
    /// The quiz or question being associated
    pub artifact_key: ArtifactKey,
    /// The node the artifact exercises
    pub node_key: NodeKey,
    /// How strongly the artifact exercises the node
    pub strength: f64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(
        key: TagKey,
        created_by: impl Into<String>,
        artifact_key: ArtifactKey,
        node_key: NodeKey,
    ) -> Self {
        Self {
            key,
            artifact_key,
            node_key,
            strength: DEFAULT_STRENGTH,
            created_by: created_by.into(),
            created_at: Utc::now(),
        }
    }

    /// Re-point the tag at a different artifact/node pair. Strength is
    /// deliberately untouched.
    pub fn rebind(&mut self, artifact_key: ArtifactKey, node_key: NodeKey) {
        self.artifact_key = artifact_key;
        self.node_key = node_key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::artifact::ArtifactKind;

    #[test]
    fn rebind_preserves_strength() {
        let mut tag = Tag::new(
            TagKey::from_id("1"),
            "u1",
            ArtifactKey::from_id(ArtifactKind::Quiz, "q1"),
            NodeKey::from_id("n1"),
        );
        tag.strength = 0.5;
        tag.rebind(
            ArtifactKey::from_id(ArtifactKind::Quiz, "q2"),
            NodeKey::from_id("n2"),
        );
        assert_eq!(tag.strength, 0.5);
        assert_eq!(tag.node_key, NodeKey::from_id("n2"));
    }
}

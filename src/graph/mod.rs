//! Core graph data structures

mod artifact;
mod edge;
mod node;
mod tag;

pub use artifact::{ArtifactKey, ArtifactKind, ArtifactStatus, Question, Quiz};
pub use edge::{Edge, EdgeKey, DEFAULT_STRENGTH};
pub use node::{KnowledgeNode, NodeKey};
pub use tag::{Tag, TagKey};

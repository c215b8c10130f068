//! Mindgraph: a graph consistency engine for directed knowledge graphs
//!
//! Models units of knowledge as nodes, directed weighted dependencies as
//! edges, and associations from external learning artifacts (quizzes,
//! questions) to nodes as tags — on top of a store that only guarantees
//! atomicity within a single entity group. The engine's job is keeping
//! the graph referentially and structurally consistent anyway: validating
//! references before writes, preventing self-loops and duplicate edges
//! without database constraints, and cascading node deletion safely under
//! partial failure.
//!
//! # Example
//!
//! ```
//! use mindgraph::{CreatorOnly, GraphApi, GraphEngine, MemoryStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let engine = GraphEngine::new(store, Arc::new(CreatorOnly));
//! let api = GraphApi::new(Arc::new(engine));
//! // api is ready for use
//! ```

mod api;
mod auth;
mod deadline;
mod engine;
mod error;
mod graph;
pub mod repo;
pub mod storage;

pub use api::GraphApi;
pub use auth::{CreatorOnly, OwnershipGuard};
pub use deadline::Deadline;
pub use engine::{CascadeReport, GraphEngine, SweepReport};
pub use error::{GraphError, GraphResult};
pub use graph::{
    ArtifactKey, ArtifactKind, ArtifactStatus, Edge, EdgeKey, KnowledgeNode, NodeKey, Question,
    Quiz, Tag, TagKey, DEFAULT_STRENGTH,
};
pub use storage::{EntityStore, MemoryStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

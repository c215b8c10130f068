//! Entity store trait definitions
//!
//! The store modeled here offers atomic writes only within a single entity
//! group (one record), eventually-consistent index scans, and an id
//! allocation primitive. There are no foreign keys and no cross-entity
//! transactions; everything above this trait is designed for partial
//! failure between two writes.

use crate::graph::{
    ArtifactKey, ArtifactStatus, Edge, EdgeKey, KnowledgeNode, NodeKey, Question, Quiz, Tag,
    TagKey,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("date parsing error: {0}")]
    DateParse(String),

    #[error("corrupt record: {0}")]
    InvalidRecord(String),

    /// A unique-index violation outside the first-writer-wins inserts
    /// (e.g. rebinding a tag onto an already-bound pair).
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Transient contention or connectivity fault; safe to retry.
    #[error("store busy: {0}")]
    Busy(String),
}

impl StorageError {
    /// Whether a retry with backoff could succeed.
    ///
    /// The repository layer retries transient faults; everything else is
    /// surfaced immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Busy(_) => true,
            StorageError::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of an edge insert against the unique (parent, child) index.
///
/// The store is the sole serialization point for duplicate edges: the
/// first writer wins and later writers get the stored edge back instead
/// of a second record.
#[derive(Debug, Clone)]
pub enum EdgeInsert {
    /// This call created the record.
    Created(Edge),
    /// The pair already existed; here is the surviving record.
    Existing(Edge),
}

/// Outcome of a tag insert against the unique (artifact, node) index.
#[derive(Debug, Clone)]
pub enum TagInsert {
    Created(Tag),
    Existing(Tag),
}

/// Trait for entity store backends.
///
/// Implementations must be thread-safe (`Send + Sync`); the engine is
/// invoked from one worker per request and shares a single store handle.
/// Every method is atomic on its own: a write either lands completely or
/// not at all, and no method spans more than one entity group.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Allocate a unique raw id. Callers wrap it into a typed key.
    async fn allocate_id(&self) -> StorageResult<String>;

    // === Nodes ===

    /// Insert or update a node record.
    async fn put_node(&self, node: &KnowledgeNode) -> StorageResult<()>;

    async fn get_node(&self, key: &NodeKey) -> StorageResult<Option<KnowledgeNode>>;

    /// Physically remove a node record. Returns whether a record existed.
    async fn delete_node(&self, key: &NodeKey) -> StorageResult<bool>;

    async fn nodes_by_owner(&self, owner: &str, limit: usize)
        -> StorageResult<Vec<KnowledgeNode>>;

    async fn list_nodes(&self, limit: usize) -> StorageResult<Vec<KnowledgeNode>>;

    // === Edges ===

    /// Insert an edge, first-writer-wins on the (parent, child) pair.
    async fn insert_edge(&self, edge: &Edge) -> StorageResult<EdgeInsert>;

    async fn get_edge(&self, key: &EdgeKey) -> StorageResult<Option<Edge>>;

    async fn edge_by_endpoints(
        &self,
        parent: &NodeKey,
        child: &NodeKey,
    ) -> StorageResult<Option<Edge>>;

    /// Index scan over edges whose parent is the given node.
    async fn edges_by_parent(&self, key: &NodeKey) -> StorageResult<Vec<Edge>>;

    /// Index scan over edges whose child is the given node.
    async fn edges_by_child(&self, key: &NodeKey) -> StorageResult<Vec<Edge>>;

    async fn delete_edge(&self, key: &EdgeKey) -> StorageResult<bool>;

    async fn list_edges(&self, limit: usize) -> StorageResult<Vec<Edge>>;

    // === Tags ===

    /// Insert a tag, first-writer-wins on the (artifact, node) pair.
    async fn insert_tag(&self, tag: &Tag) -> StorageResult<TagInsert>;

    async fn get_tag(&self, key: &TagKey) -> StorageResult<Option<Tag>>;

    async fn tag_by_pair(
        &self,
        artifact: &ArtifactKey,
        node: &NodeKey,
    ) -> StorageResult<Option<Tag>>;

    /// Update an existing tag record (used for rebinding).
    async fn put_tag(&self, tag: &Tag) -> StorageResult<()>;

    async fn tags_by_artifact(&self, key: &ArtifactKey, limit: usize) -> StorageResult<Vec<Tag>>;

    async fn tags_by_node(&self, key: &NodeKey) -> StorageResult<Vec<Tag>>;

    async fn delete_tag(&self, key: &TagKey) -> StorageResult<bool>;

    async fn list_tags(&self, limit: usize) -> StorageResult<Vec<Tag>>;

    // === Artifacts ===

    async fn put_quiz(&self, quiz: &Quiz) -> StorageResult<()>;

    async fn get_quiz(&self, key: &ArtifactKey) -> StorageResult<Option<Quiz>>;

    async fn quizzes_by_status(
        &self,
        status: ArtifactStatus,
        limit: usize,
    ) -> StorageResult<Vec<Quiz>>;

    async fn put_question(&self, question: &Question) -> StorageResult<()>;

    async fn get_question(&self, key: &ArtifactKey) -> StorageResult<Option<Question>>;

    async fn questions_by_status(
        &self,
        status: ArtifactStatus,
        limit: usize,
    ) -> StorageResult<Vec<Question>>;
}

//! Shared helpers for integration tests
#![allow(dead_code)]

use mindgraph::{
    ArtifactKey, ArtifactStatus, CreatorOnly, Edge, EdgeKey, EntityStore, GraphApi,
    GraphEngine, KnowledgeNode, MemoryStore, NodeKey, Question, Quiz, StorageError,
    StorageResult, Tag, TagKey,
};
use mindgraph::storage::{EdgeInsert, TagInsert};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An api over a fresh in-memory store.
pub fn memory_api() -> GraphApi {
    let engine = GraphEngine::new(Arc::new(MemoryStore::new()), Arc::new(CreatorOnly));
    GraphApi::new(Arc::new(engine))
}

/// An api plus a handle to its fault-injecting store.
pub fn flaky_api() -> (GraphApi, Arc<FlakyStore>) {
    let store = Arc::new(FlakyStore::new());
    let engine = GraphEngine::new(store.clone(), Arc::new(CreatorOnly));
    (GraphApi::new(Arc::new(engine)), store)
}

/// Delegating store that can be told to fail edge/tag deletes, for
/// exercising the partial-failure paths of the cascade.
pub struct FlakyStore {
    inner: MemoryStore,
    fail_edge_deletes: AtomicBool,
    fail_tag_deletes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_edge_deletes: AtomicBool::new(false),
            fail_tag_deletes: AtomicBool::new(false),
        }
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_edge_deletes.store(fail, Ordering::SeqCst);
        self.fail_tag_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EntityStore for FlakyStore {
    async fn allocate_id(&self) -> StorageResult<String> {
        self.inner.allocate_id().await
    }

    async fn put_node(&self, node: &KnowledgeNode) -> StorageResult<()> {
        self.inner.put_node(node).await
    }

    async fn get_node(&self, key: &NodeKey) -> StorageResult<Option<KnowledgeNode>> {
        self.inner.get_node(key).await
    }

    async fn delete_node(&self, key: &NodeKey) -> StorageResult<bool> {
        self.inner.delete_node(key).await
    }

    async fn nodes_by_owner(
        &self,
        owner: &str,
        limit: usize,
    ) -> StorageResult<Vec<KnowledgeNode>> {
        self.inner.nodes_by_owner(owner, limit).await
    }

    async fn list_nodes(&self, limit: usize) -> StorageResult<Vec<KnowledgeNode>> {
        self.inner.list_nodes(limit).await
    }

    async fn insert_edge(&self, edge: &Edge) -> StorageResult<EdgeInsert> {
        self.inner.insert_edge(edge).await
    }

    async fn get_edge(&self, key: &EdgeKey) -> StorageResult<Option<Edge>> {
        self.inner.get_edge(key).await
    }

    async fn edge_by_endpoints(
        &self,
        parent: &NodeKey,
        child: &NodeKey,
    ) -> StorageResult<Option<Edge>> {
        self.inner.edge_by_endpoints(parent, child).await
    }

    async fn edges_by_parent(&self, key: &NodeKey) -> StorageResult<Vec<Edge>> {
        self.inner.edges_by_parent(key).await
    }

    async fn edges_by_child(&self, key: &NodeKey) -> StorageResult<Vec<Edge>> {
        self.inner.edges_by_child(key).await
    }

    async fn delete_edge(&self, key: &EdgeKey) -> StorageResult<bool> {
        if self.fail_edge_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Busy("injected fault".to_string()));
        }
        self.inner.delete_edge(key).await
    }

    async fn list_edges(&self, limit: usize) -> StorageResult<Vec<Edge>> {
        self.inner.list_edges(limit).await
    }

    async fn insert_tag(&self, tag: &Tag) -> StorageResult<TagInsert> {
        self.inner.insert_tag(tag).await
    }

    async fn get_tag(&self, key: &TagKey) -> StorageResult<Option<Tag>> {
        self.inner.get_tag(key).await
    }

    async fn tag_by_pair(
        &self,
        artifact: &ArtifactKey,
        node: &NodeKey,
    ) -> StorageResult<Option<Tag>> {
        self.inner.tag_by_pair(artifact, node).await
    }

    async fn put_tag(&self, tag: &Tag) -> StorageResult<()> {
        self.inner.put_tag(tag).await
    }

    async fn tags_by_artifact(&self, key: &ArtifactKey, limit: usize) -> StorageResult<Vec<Tag>> {
        self.inner.tags_by_artifact(key, limit).await
    }

    async fn tags_by_node(&self, key: &NodeKey) -> StorageResult<Vec<Tag>> {
        self.inner.tags_by_node(key).await
    }

    async fn delete_tag(&self, key: &TagKey) -> StorageResult<bool> {
        if self.fail_tag_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Busy("injected fault".to_string()));
        }
        self.inner.delete_tag(key).await
    }

    async fn list_tags(&self, limit: usize) -> StorageResult<Vec<Tag>> {
        self.inner.list_tags(limit).await
    }

    async fn put_quiz(&self, quiz: &Quiz) -> StorageResult<()> {
        self.inner.put_quiz(quiz).await
    }

    async fn get_quiz(&self, key: &ArtifactKey) -> StorageResult<Option<Quiz>> {
        self.inner.get_quiz(key).await
    }

    async fn quizzes_by_status(
        &self,
        status: ArtifactStatus,
        limit: usize,
    ) -> StorageResult<Vec<Quiz>> {
        self.inner.quizzes_by_status(status, limit).await
    }

    async fn put_question(&self, question: &Question) -> StorageResult<()> {
        self.inner.put_question(question).await
    }

    async fn get_question(&self, key: &ArtifactKey) -> StorageResult<Option<Question>> {
        self.inner.get_question(key).await
    }

    async fn questions_by_status(
        &self,
        status: ArtifactStatus,
        limit: usize,
    ) -> StorageResult<Vec<Question>> {
        self.inner.questions_by_status(status, limit).await
    }
}

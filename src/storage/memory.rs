//! In-memory entity store
//!
//! Backs tests and embedded use. Mirrors the semantics of the durable
//! backend exactly: per-record atomic writes, first-writer-wins pair
//! inserts, no cross-record transactions.

use super::traits::{EdgeInsert, EntityStore, StorageError, StorageResult, TagInsert};
use crate::graph::{
    ArtifactKey, ArtifactStatus, Edge, EdgeKey, KnowledgeNode, NodeKey, Question, Quiz, Tag,
    TagKey,
};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

type PairIndex = DashMap<(String, String), String>;

/// Concurrent map-backed store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: DashMap<String, KnowledgeNode>,
    edges: DashMap<String, Edge>,
    /// (parent, child) -> edge key; the uniqueness authority for edges
    edge_pairs: PairIndex,
    tags: DashMap<String, Tag>,
    /// (artifact, node) -> tag key; the uniqueness authority for tags
    tag_pairs: PairIndex,
    quizzes: DashMap<String, Quiz>,
    questions: DashMap<String, Question>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn edge_pair(edge: &Edge) -> (String, String) {
        (
            edge.parent_key.as_str().to_string(),
            edge.child_key.as_str().to_string(),
        )
    }

    fn tag_pair(tag: &Tag) -> (String, String) {
        (
            tag.artifact_key.as_str().to_string(),
            tag.node_key.as_str().to_string(),
        )
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn allocate_id(&self) -> StorageResult<String> {
        Ok(uuid::Uuid::new_v4().to_string())
    }

    // === Nodes ===

    async fn put_node(&self, node: &KnowledgeNode) -> StorageResult<()> {
        self.nodes
            .insert(node.key.as_str().to_string(), node.clone());
        Ok(())
    }

    async fn get_node(&self, key: &NodeKey) -> StorageResult<Option<KnowledgeNode>> {
        Ok(self.nodes.get(key.as_str()).map(|r| r.clone()))
    }

    async fn delete_node(&self, key: &NodeKey) -> StorageResult<bool> {
        Ok(self.nodes.remove(key.as_str()).is_some())
    }

    async fn nodes_by_owner(
        &self,
        owner: &str,
        limit: usize,
    ) -> StorageResult<Vec<KnowledgeNode>> {
        Ok(self
            .nodes
            .iter()
            .filter(|r| r.created_by == owner)
            .take(limit)
            .map(|r| r.clone())
            .collect())
    }

    async fn list_nodes(&self, limit: usize) -> StorageResult<Vec<KnowledgeNode>> {
        Ok(self.nodes.iter().take(limit).map(|r| r.clone()).collect())
    }

    // === Edges ===

    async fn insert_edge(&self, edge: &Edge) -> StorageResult<EdgeInsert> {
        match self.edge_pairs.entry(Self::edge_pair(edge)) {
            Entry::Occupied(mut occupied) => {
                if let Some(existing) = self.edges.get(occupied.get()) {
                    return Ok(EdgeInsert::Existing(existing.clone()));
                }
                // Index pointed at a record deleted mid-race; claim the pair.
                occupied.insert(edge.key.as_str().to_string());
                self.edges
                    .insert(edge.key.as_str().to_string(), edge.clone());
                Ok(EdgeInsert::Created(edge.clone()))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(edge.key.as_str().to_string());
                self.edges
                    .insert(edge.key.as_str().to_string(), edge.clone());
                Ok(EdgeInsert::Created(edge.clone()))
            }
        }
    }

    async fn get_edge(&self, key: &EdgeKey) -> StorageResult<Option<Edge>> {
        Ok(self.edges.get(key.as_str()).map(|r| r.clone()))
    }

    async fn edge_by_endpoints(
        &self,
        parent: &NodeKey,
        child: &NodeKey,
    ) -> StorageResult<Option<Edge>> {
        let pair = (
            parent.as_str().to_string(),
            child.as_str().to_string(),
        );
        match self.edge_pairs.get(&pair) {
            Some(key) => Ok(self.edges.get(key.value()).map(|r| r.clone())),
            None => Ok(None),
        }
    }

    async fn edges_by_parent(&self, key: &NodeKey) -> StorageResult<Vec<Edge>> {
        Ok(self
            .edges
            .iter()
            .filter(|r| &r.parent_key == key)
            .map(|r| r.clone())
            .collect())
    }

    async fn edges_by_child(&self, key: &NodeKey) -> StorageResult<Vec<Edge>> {
        Ok(self
            .edges
            .iter()
            .filter(|r| &r.child_key == key)
            .map(|r| r.clone())
            .collect())
    }

    async fn delete_edge(&self, key: &EdgeKey) -> StorageResult<bool> {
        match self.edges.remove(key.as_str()) {
            Some((_, edge)) => {
                // Clear the pair index only if it still points at this record.
                self.edge_pairs
                    .remove_if(&Self::edge_pair(&edge), |_, v| v == key.as_str());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_edges(&self, limit: usize) -> StorageResult<Vec<Edge>> {
        Ok(self.edges.iter().take(limit).map(|r| r.clone()).collect())
    }

    // === Tags ===

    async fn insert_tag(&self, tag: &Tag) -> StorageResult<TagInsert> {
        match self.tag_pairs.entry(Self::tag_pair(tag)) {
            Entry::Occupied(mut occupied) => {
                if let Some(existing) = self.tags.get(occupied.get()) {
                    return Ok(TagInsert::Existing(existing.clone()));
                }
                occupied.insert(tag.key.as_str().to_string());
                self.tags.insert(tag.key.as_str().to_string(), tag.clone());
                Ok(TagInsert::Created(tag.clone()))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(tag.key.as_str().to_string());
                self.tags.insert(tag.key.as_str().to_string(), tag.clone());
                Ok(TagInsert::Created(tag.clone()))
            }
        }
    }

    async fn get_tag(&self, key: &TagKey) -> StorageResult<Option<Tag>> {
        Ok(self.tags.get(key.as_str()).map(|r| r.clone()))
    }

    async fn tag_by_pair(
        &self,
        artifact: &ArtifactKey,
        node: &NodeKey,
    ) -> StorageResult<Option<Tag>> {
        let pair = (
            artifact.as_str().to_string(),
            node.as_str().to_string(),
        );
        match self.tag_pairs.get(&pair) {
            Some(key) => Ok(self.tags.get(key.value()).map(|r| r.clone())),
            None => Ok(None),
        }
    }

    async fn put_tag(&self, tag: &Tag) -> StorageResult<()> {
        let previous = self
            .tags
            .get(tag.key.as_str())
            .map(|r| Self::tag_pair(&r));

        let new_pair = Self::tag_pair(tag);
        match self.tag_pairs.entry(new_pair) {
            Entry::Occupied(occupied) if occupied.get() != tag.key.as_str() => {
                return Err(StorageError::Constraint(
                    "tag pair already bound".to_string(),
                ));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(vacant) => {
                vacant.insert(tag.key.as_str().to_string());
            }
        }
        if let Some(old_pair) = previous {
            if old_pair != Self::tag_pair(tag) {
                self.tag_pairs
                    .remove_if(&old_pair, |_, v| v == tag.key.as_str());
            }
        }
        self.tags.insert(tag.key.as_str().to_string(), tag.clone());
        Ok(())
    }

    async fn tags_by_artifact(
        &self,
        key: &ArtifactKey,
        limit: usize,
    ) -> StorageResult<Vec<Tag>> {
        Ok(self
            .tags
            .iter()
            .filter(|r| &r.artifact_key == key)
            .take(limit)
            .map(|r| r.clone())
            .collect())
    }

    async fn tags_by_node(&self, key: &NodeKey) -> StorageResult<Vec<Tag>> {
        Ok(self
            .tags
            .iter()
            .filter(|r| &r.node_key == key)
            .map(|r| r.clone())
            .collect())
    }

    async fn delete_tag(&self, key: &TagKey) -> StorageResult<bool> {
        match self.tags.remove(key.as_str()) {
            Some((_, tag)) => {
                self.tag_pairs
                    .remove_if(&Self::tag_pair(&tag), |_, v| v == key.as_str());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_tags(&self, limit: usize) -> StorageResult<Vec<Tag>> {
        Ok(self.tags.iter().take(limit).map(|r| r.clone()).collect())
    }

    // === Artifacts ===

    async fn put_quiz(&self, quiz: &Quiz) -> StorageResult<()> {
        self.quizzes
            .insert(quiz.key.as_str().to_string(), quiz.clone());
        Ok(())
    }

    async fn get_quiz(&self, key: &ArtifactKey) -> StorageResult<Option<Quiz>> {
        Ok(self.quizzes.get(key.as_str()).map(|r| r.clone()))
    }

    async fn quizzes_by_status(
        &self,
        status: ArtifactStatus,
        limit: usize,
    ) -> StorageResult<Vec<Quiz>> {
        Ok(self
            .quizzes
            .iter()
            .filter(|r| r.status == status)
            .take(limit)
            .map(|r| r.clone())
            .collect())
    }

    async fn put_question(&self, question: &Question) -> StorageResult<()> {
        self.questions
            .insert(question.key.as_str().to_string(), question.clone());
        Ok(())
    }

    async fn get_question(&self, key: &ArtifactKey) -> StorageResult<Option<Question>> {
        Ok(self.questions.get(key.as_str()).map(|r| r.clone()))
    }

    async fn questions_by_status(
        &self,
        status: ArtifactStatus,
        limit: usize,
    ) -> StorageResult<Vec<Question>> {
        Ok(self
            .questions
            .iter()
            .filter(|r| r.status == status)
            .take(limit)
            .map(|r| r.clone())
            .collect())
    }
}

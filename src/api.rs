//! Transport-independent API layer.
//!
//! `GraphApi` is the single entry point for all consumer-facing
//! operations. Transports (HTTP, RPC, direct embedding) call `GraphApi`
//! methods — they never reach into the repositories or the engine
//! directly. The layer owns exactly two concerns: resolving the acting
//! principal (`None` → `Unauthorized`) and stamping each call with the
//! configured default deadline. Everything else is delegation.

use crate::deadline::Deadline;
use crate::engine::{CascadeReport, GraphEngine, SweepReport};
use crate::error::{GraphError, GraphResult};
use crate::graph::{
    ArtifactKey, Edge, KnowledgeNode, NodeKey, Question, Quiz, Tag, TagKey,
};
use std::sync::Arc;
use std::time::Duration;

/// Single entry point for all consumer-facing operations.
#[derive(Clone)]
pub struct GraphApi {
    engine: Arc<GraphEngine>,
    op_timeout: Option<Duration>,
}

impl GraphApi {
    /// Create a new API instance with no default deadline.
    pub fn new(engine: Arc<GraphEngine>) -> Self {
        Self {
            engine,
            op_timeout: None,
        }
    }

    /// Apply a default per-operation deadline to every call.
    pub fn with_deadline(mut self, timeout: Duration) -> Self {
        self.op_timeout = Some(timeout);
        self
    }

    fn deadline(&self) -> Deadline {
        match self.op_timeout {
            Some(timeout) => Deadline::after(timeout),
            None => Deadline::none(),
        }
    }

    fn require<'a>(principal: Option<&'a str>) -> GraphResult<&'a str> {
        principal.ok_or(GraphError::Unauthorized)
    }

    // === Nodes ===

    pub async fn create_node(
        &self,
        principal: Option<&str>,
        name: &str,
        description: &str,
    ) -> GraphResult<KnowledgeNode> {
        let owner = Self::require(principal)?;
        self.engine
            .nodes()
            .create(owner, name, description, &self.deadline())
            .await
    }

    pub async fn update_node(
        &self,
        principal: Option<&str>,
        key: &NodeKey,
        name: &str,
        description: &str,
    ) -> GraphResult<KnowledgeNode> {
        let owner = Self::require(principal)?;
        self.engine
            .nodes()
            .update(owner, key, name, description, &self.deadline())
            .await
    }

    /// Delete a node and cascade to everything referencing it. The report
    /// says whether any cleanup was left for the sweep.
    pub async fn delete_node(
        &self,
        principal: Option<&str>,
        key: &NodeKey,
    ) -> GraphResult<CascadeReport> {
        let owner = Self::require(principal)?;
        self.engine.delete_node(owner, key, &self.deadline()).await
    }

    pub async fn get_node(&self, key: &NodeKey) -> GraphResult<KnowledgeNode> {
        self.engine.get_node(key, &self.deadline()).await
    }

    pub async fn list_nodes_by_owner(
        &self,
        principal: Option<&str>,
        limit: usize,
    ) -> GraphResult<Vec<KnowledgeNode>> {
        let owner = Self::require(principal)?;
        self.engine
            .list_nodes_by_owner(owner, limit, &self.deadline())
            .await
    }

    pub async fn list_all_nodes(&self, limit: usize) -> GraphResult<Vec<KnowledgeNode>> {
        self.engine.list_nodes(limit, &self.deadline()).await
    }

    // === Edges ===

    pub async fn create_edge(
        &self,
        principal: Option<&str>,
        parent: &NodeKey,
        child: &NodeKey,
    ) -> GraphResult<Edge> {
        let owner = Self::require(principal)?;
        self.engine
            .create_edge(owner, parent, child, &self.deadline())
            .await
    }

    pub async fn delete_edge(
        &self,
        principal: Option<&str>,
        parent: &NodeKey,
        child: &NodeKey,
    ) -> GraphResult<()> {
        let owner = Self::require(principal)?;
        self.engine
            .delete_edge(owner, parent, child, &self.deadline())
            .await
    }

    pub async fn list_all_edges(&self, limit: usize) -> GraphResult<Vec<Edge>> {
        self.engine.list_edges(limit, &self.deadline()).await
    }

    // === Tags ===

    pub async fn create_tag(
        &self,
        principal: Option<&str>,
        artifact: &ArtifactKey,
        node: &NodeKey,
    ) -> GraphResult<Tag> {
        let owner = Self::require(principal)?;
        self.engine
            .create_tag(owner, artifact, node, &self.deadline())
            .await
    }

    pub async fn rebind_tag(
        &self,
        principal: Option<&str>,
        key: &TagKey,
        artifact: &ArtifactKey,
        node: &NodeKey,
    ) -> GraphResult<Tag> {
        let owner = Self::require(principal)?;
        self.engine
            .rebind_tag(owner, key, artifact, node, &self.deadline())
            .await
    }

    pub async fn delete_tag(&self, principal: Option<&str>, key: &TagKey) -> GraphResult<()> {
        let owner = Self::require(principal)?;
        self.engine.delete_tag(owner, key, &self.deadline()).await
    }

    pub async fn list_tags_by_artifact(
        &self,
        artifact: &ArtifactKey,
        limit: usize,
    ) -> GraphResult<Vec<Tag>> {
        self.engine
            .tags_by_artifact(artifact, limit, &self.deadline())
            .await
    }

    pub async fn list_tags_by_node(&self, node: &NodeKey) -> GraphResult<Vec<Tag>> {
        self.engine.tags_by_node(node, &self.deadline()).await
    }

    // === Artifacts ===

    pub async fn create_quiz(
        &self,
        principal: Option<&str>,
        name: &str,
        description: &str,
        url: Option<String>,
    ) -> GraphResult<Quiz> {
        let owner = Self::require(principal)?;
        self.engine
            .artifacts()
            .create_quiz(owner, name, description, url, &self.deadline())
            .await
    }

    pub async fn update_quiz(
        &self,
        principal: Option<&str>,
        key: &ArtifactKey,
        name: &str,
        description: &str,
        url: Option<String>,
    ) -> GraphResult<Quiz> {
        let owner = Self::require(principal)?;
        self.engine
            .artifacts()
            .update_quiz(owner, key, name, description, url, &self.deadline())
            .await
    }

    /// Soft delete: the quiz record survives with `Expired` status.
    pub async fn expire_quiz(
        &self,
        principal: Option<&str>,
        key: &ArtifactKey,
    ) -> GraphResult<Quiz> {
        let owner = Self::require(principal)?;
        self.engine
            .artifacts()
            .expire_quiz(owner, key, &self.deadline())
            .await
    }

    pub async fn list_active_quizzes(&self, limit: usize) -> GraphResult<Vec<Quiz>> {
        self.engine
            .artifacts()
            .active_quizzes(limit, &self.deadline())
            .await
    }

    pub async fn create_question(
        &self,
        principal: Option<&str>,
        description: &str,
        options: Vec<String>,
        answer: u32,
    ) -> GraphResult<Question> {
        let owner = Self::require(principal)?;
        self.engine
            .artifacts()
            .create_question(owner, description, options, answer, &self.deadline())
            .await
    }

    pub async fn update_question(
        &self,
        principal: Option<&str>,
        key: &ArtifactKey,
        description: &str,
        options: Vec<String>,
        answer: u32,
    ) -> GraphResult<Question> {
        let owner = Self::require(principal)?;
        self.engine
            .artifacts()
            .update_question(owner, key, description, options, answer, &self.deadline())
            .await
    }

    /// Soft delete: the question record survives with `Expired` status.
    pub async fn expire_question(
        &self,
        principal: Option<&str>,
        key: &ArtifactKey,
    ) -> GraphResult<Question> {
        let owner = Self::require(principal)?;
        self.engine
            .artifacts()
            .expire_question(owner, key, &self.deadline())
            .await
    }

    pub async fn list_active_questions(&self, limit: usize) -> GraphResult<Vec<Question>> {
        self.engine
            .artifacts()
            .active_questions(limit, &self.deadline())
            .await
    }

    // === Maintenance ===

    /// Run one bounded repair pass over dangling references.
    pub async fn sweep(&self, limit: usize) -> GraphResult<SweepReport> {
        self.engine.sweep(limit, &self.deadline()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CreatorOnly;
    use crate::storage::MemoryStore;

    fn api() -> GraphApi {
        let engine = GraphEngine::new(Arc::new(MemoryStore::new()), Arc::new(CreatorOnly));
        GraphApi::new(Arc::new(engine))
    }

    // === Scenario: every mutation demands a principal ===
    #[tokio::test]
    async fn missing_principal_is_unauthorized() {
        let api = api();
        assert!(matches!(
            api.create_node(None, "A", "").await,
            Err(GraphError::Unauthorized)
        ));
        assert!(matches!(
            api.list_nodes_by_owner(None, 10).await,
            Err(GraphError::Unauthorized)
        ));
        assert!(matches!(
            api.create_edge(None, &NodeKey::from_id("a"), &NodeKey::from_id("b"))
                .await,
            Err(GraphError::Unauthorized)
        ));
        assert!(matches!(
            api.create_quiz(None, "Q", "", None).await,
            Err(GraphError::Unauthorized)
        ));
    }

    // === Scenario: reads need no principal ===
    #[tokio::test]
    async fn reads_are_open() {
        let api = api();
        let node = api.create_node(Some("u1"), "A", "").await.unwrap();
        assert!(api.get_node(&node.key).await.is_ok());
        assert_eq!(api.list_all_nodes(10).await.unwrap().len(), 1);
        assert!(api.list_all_edges(10).await.unwrap().is_empty());
    }

    // === Scenario: the algebra/calculus dependency round trip ===
    #[tokio::test]
    async fn dependency_round_trip() {
        let api = api();
        let n1 = api.create_node(Some("u1"), "Algebra", "").await.unwrap();
        let n2 = api.create_node(Some("u1"), "Calculus", "").await.unwrap();

        // Calculus depends on Algebra.
        let edge = api
            .create_edge(Some("u1"), &n2.key, &n1.key)
            .await
            .unwrap();
        assert_eq!(edge.strength, 1.0);

        // The reverse direction is a distinct pair and also succeeds.
        api.create_edge(Some("u1"), &n1.key, &n2.key).await.unwrap();
        assert_eq!(api.list_all_edges(10).await.unwrap().len(), 2);

        // After deleting Algebra no edge touches it any more.
        api.delete_node(Some("u1"), &n1.key).await.unwrap();
        let edges = api.list_all_edges(10).await.unwrap();
        assert!(edges.iter().all(|e| !e.touches(&n1.key)));
        assert!(edges.is_empty());
    }

    // === Scenario: list limits are caller-supplied, not defaulted ===
    #[tokio::test]
    async fn limits_are_respected() {
        let api = api();
        for i in 0..5 {
            api.create_node(Some("u1"), &format!("n{i}"), "").await.unwrap();
        }
        assert_eq!(api.list_all_nodes(3).await.unwrap().len(), 3);
        assert_eq!(
            api.list_nodes_by_owner(Some("u1"), 2).await.unwrap().len(),
            2
        );
    }

    // === Scenario: tag lifecycle through the api surface ===
    #[tokio::test]
    async fn tag_lifecycle() {
        let api = api();
        let node = api.create_node(Some("u1"), "A", "").await.unwrap();
        let quiz = api
            .create_quiz(Some("u1"), "Quiz", "", None)
            .await
            .unwrap();

        let tag = api
            .create_tag(Some("u1"), &quiz.key, &node.key)
            .await
            .unwrap();
        assert_eq!(
            api.list_tags_by_artifact(&quiz.key, 10).await.unwrap().len(),
            1
        );
        assert_eq!(api.list_tags_by_node(&node.key).await.unwrap().len(), 1);

        api.expire_quiz(Some("u1"), &quiz.key).await.unwrap();
        assert!(api.list_active_quizzes(10).await.unwrap().is_empty());
        // Historical tag still resolves against the expired quiz.
        assert_eq!(
            api.list_tags_by_artifact(&quiz.key, 10).await.unwrap().len(),
            1
        );

        api.delete_tag(Some("u1"), &tag.key).await.unwrap();
        assert!(api
            .list_tags_by_artifact(&quiz.key, 10)
            .await
            .unwrap()
            .is_empty());
    }

    // === Scenario: a default deadline applies to every call ===
    #[tokio::test]
    async fn configured_deadline_applies() {
        let engine = GraphEngine::new(Arc::new(MemoryStore::new()), Arc::new(CreatorOnly));
        let api = GraphApi::new(Arc::new(engine)).with_deadline(Duration::ZERO);
        assert!(matches!(
            api.create_node(Some("u1"), "A", "").await,
            Err(GraphError::DeadlineExceeded)
        ));
    }
}

//! Artifact repository: quizzes and questions
//!
//! Artifacts are soft-deleted (status moves to `Expired`) because tags
//! reference them historically; the record itself must stay resolvable.

use super::with_retry;
use crate::auth::OwnershipGuard;
use crate::deadline::Deadline;
use crate::error::{GraphError, GraphResult};
use crate::graph::{ArtifactKey, ArtifactKind, ArtifactStatus, Question, Quiz};
use crate::storage::EntityStore;
use std::sync::Arc;

pub struct ArtifactRepository {
    store: Arc<dyn EntityStore>,
    guard: Arc<dyn OwnershipGuard>,
}

impl ArtifactRepository {
    pub fn new(store: Arc<dyn EntityStore>, guard: Arc<dyn OwnershipGuard>) -> Self {
        Self { store, guard }
    }

    /// Whether the referenced artifact record exists at all, expired or
    /// not. Dispatches on the kind encoded in the key; an unrecognized
    /// key refers to nothing.
    pub async fn exists(&self, key: &ArtifactKey, deadline: &Deadline) -> GraphResult<bool> {
        deadline.check()?;
        match key.kind() {
            Some(ArtifactKind::Quiz) => {
                Ok(with_retry(|| self.store.get_quiz(key)).await?.is_some())
            }
            Some(ArtifactKind::Question) => {
                Ok(with_retry(|| self.store.get_question(key)).await?.is_some())
            }
            None => Ok(false),
        }
    }

    // === Quizzes ===

    pub async fn create_quiz(
        &self,
        owner: &str,
        name: &str,
        description: &str,
        url: Option<String>,
        deadline: &Deadline,
    ) -> GraphResult<Quiz> {
        deadline.check()?;
        let id = with_retry(|| self.store.allocate_id()).await?;
        let quiz = Quiz::new(
            ArtifactKey::from_id(ArtifactKind::Quiz, &id),
            owner,
            name,
            description,
            url,
        );
        deadline.check()?;
        with_retry(|| self.store.put_quiz(&quiz)).await?;
        Ok(quiz)
    }

    pub async fn get_quiz(&self, key: &ArtifactKey, deadline: &Deadline) -> GraphResult<Quiz> {
        deadline.check()?;
        with_retry(|| self.store.get_quiz(key))
            .await?
            .ok_or_else(|| GraphError::ArtifactNotFound(key.clone()))
    }

    pub async fn update_quiz(
        &self,
        owner: &str,
        key: &ArtifactKey,
        name: &str,
        description: &str,
        url: Option<String>,
        deadline: &Deadline,
    ) -> GraphResult<Quiz> {
        let mut quiz = self.get_quiz(key, deadline).await?;
        self.guard.ensure_owner(&quiz.created_by, owner).await?;
        quiz.update(name, description, url);
        deadline.check()?;
        with_retry(|| self.store.put_quiz(&quiz)).await?;
        Ok(quiz)
    }

    /// Soft delete: flips status to `Expired`, idempotently.
    pub async fn expire_quiz(
        &self,
        owner: &str,
        key: &ArtifactKey,
        deadline: &Deadline,
    ) -> GraphResult<Quiz> {
        let mut quiz = self.get_quiz(key, deadline).await?;
        self.guard.ensure_owner(&quiz.created_by, owner).await?;
        quiz.expire();
        deadline.check()?;
        with_retry(|| self.store.put_quiz(&quiz)).await?;
        Ok(quiz)
    }

    pub async fn active_quizzes(
        &self,
        limit: usize,
        deadline: &Deadline,
    ) -> GraphResult<Vec<Quiz>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.quizzes_by_status(ArtifactStatus::Active, limit)).await?)
    }

    // === Questions ===

    pub async fn create_question(
        &self,
        owner: &str,
        description: &str,
        options: Vec<String>,
        answer: u32,
        deadline: &Deadline,
    ) -> GraphResult<Question> {
        deadline.check()?;
        let id = with_retry(|| self.store.allocate_id()).await?;
        let question = Question::new(
            ArtifactKey::from_id(ArtifactKind::Question, &id),
            owner,
            description,
            options,
            answer,
        );
        deadline.check()?;
        with_retry(|| self.store.put_question(&question)).await?;
        Ok(question)
    }

    pub async fn get_question(
        &self,
        key: &ArtifactKey,
        deadline: &Deadline,
    ) -> GraphResult<Question> {
        deadline.check()?;
        with_retry(|| self.store.get_question(key))
            .await?
            .ok_or_else(|| GraphError::ArtifactNotFound(key.clone()))
    }

    pub async fn update_question(
        &self,
        owner: &str,
        key: &ArtifactKey,
        description: &str,
        options: Vec<String>,
        answer: u32,
        deadline: &Deadline,
    ) -> GraphResult<Question> {
        let mut question = self.get_question(key, deadline).await?;
        self.guard.ensure_owner(&question.created_by, owner).await?;
        question.update(description, options, answer);
        deadline.check()?;
        with_retry(|| self.store.put_question(&question)).await?;
        Ok(question)
    }

    /// Soft delete: flips status to `Expired`, idempotently.
    pub async fn expire_question(
        &self,
        owner: &str,
        key: &ArtifactKey,
        deadline: &Deadline,
    ) -> GraphResult<Question> {
        let mut question = self.get_question(key, deadline).await?;
        self.guard.ensure_owner(&question.created_by, owner).await?;
        question.expire();
        deadline.check()?;
        with_retry(|| self.store.put_question(&question)).await?;
        Ok(question)
    }

    pub async fn active_questions(
        &self,
        limit: usize,
        deadline: &Deadline,
    ) -> GraphResult<Vec<Question>> {
        deadline.check()?;
        Ok(with_retry(|| self.store.questions_by_status(ArtifactStatus::Active, limit)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CreatorOnly;
    use crate::storage::MemoryStore;

    fn repo() -> ArtifactRepository {
        ArtifactRepository::new(Arc::new(MemoryStore::new()), Arc::new(CreatorOnly))
    }

    #[tokio::test]
    async fn expired_quiz_still_exists() {
        let repo = repo();
        let quiz = repo
            .create_quiz("u1", "Fractions", "Practice", None, &Deadline::none())
            .await
            .unwrap();

        repo.expire_quiz("u1", &quiz.key, &Deadline::none())
            .await
            .unwrap();

        assert!(repo.exists(&quiz.key, &Deadline::none()).await.unwrap());
        assert!(repo
            .active_quizzes(10, &Deadline::none())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn expire_by_non_owner_is_forbidden() {
        let repo = repo();
        let quiz = repo
            .create_quiz("u1", "Fractions", "Practice", None, &Deadline::none())
            .await
            .unwrap();

        let result = repo.expire_quiz("u2", &quiz.key, &Deadline::none()).await;
        assert!(matches!(result, Err(GraphError::Forbidden(_))));
        assert_eq!(
            repo.get_quiz(&quiz.key, &Deadline::none())
                .await
                .unwrap()
                .status,
            ArtifactStatus::Active
        );
    }

    #[tokio::test]
    async fn exists_dispatches_on_key_kind() {
        let repo = repo();
        let question = repo
            .create_question(
                "u1",
                "2 + 2 = ?",
                vec!["3".into(), "4".into()],
                1,
                &Deadline::none(),
            )
            .await
            .unwrap();

        assert!(repo.exists(&question.key, &Deadline::none()).await.unwrap());
        assert!(!repo
            .exists(
                &ArtifactKey::from_id(ArtifactKind::Quiz, "missing"),
                &Deadline::none()
            )
            .await
            .unwrap());
        assert!(!repo
            .exists(&ArtifactKey::from_string("node:1"), &Deadline::none())
            .await
            .unwrap());
    }
}

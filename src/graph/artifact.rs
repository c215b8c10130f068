//! Learning artifacts: quizzes and questions referenced by tags
//!
//! Artifacts are soft-deleted: "deleting" one moves its status to
//! `Expired` so that historical tags stay resolvable for audit. Graph
//! topology entities (nodes, edges, tags) are hard-deleted instead; the
//! two strategies are intentionally different and must not be unified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of artifact a key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Quiz,
    Question,
}

impl ArtifactKind {
    fn prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Quiz => "quiz:",
            ArtifactKind::Question => "question:",
        }
    }
}

/// Opaque reference to a quiz or question.
///
/// The kind is recoverable from the key text, so lookups dispatch on an
/// explicit tag rather than a runtime type registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    pub fn from_id(kind: ArtifactKind, id: impl AsRef<str>) -> Self {
        Self(format!("{}{}", kind.prefix(), id.as_ref()))
    }

    pub fn from_string(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The artifact kind encoded in the key, if recognizable.
    pub fn kind(&self) -> Option<ArtifactKind> {
        if self.0.starts_with(ArtifactKind::Quiz.prefix()) {
            Some(ArtifactKind::Quiz)
        } else if self.0.starts_with(ArtifactKind::Question.prefix()) {
            Some(ArtifactKind::Question)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ArtifactKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle status shared by quizzes and questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArtifactStatus {
    Active,
    Draft,
    Expired,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactStatus::Active => "ACTIVE",
            ArtifactStatus::Draft => "DRAFT",
            ArtifactStatus::Expired => "EXPIRED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ArtifactStatus::Active),
            "DRAFT" => Some(ArtifactStatus::Draft),
            "EXPIRED" => Some(ArtifactStatus::Expired),
            _ => None,
        }
    }
}

/// A quiz hosted elsewhere, referenced by tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub key: ArtifactKey,
    pub name: String,
    pub description: String,
    /// External URL of the quiz, when hosted outside the system
    pub url: Option<String>,
    pub status: ArtifactStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(
        key: ArtifactKey,
        created_by: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        url: Option<String>,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            description: description.into(),
            url,
            status: ArtifactStatus::Active,
            created_by: created_by.into(),
            created_at: Utc::now(),
        }
    }

    pub fn update(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        url: Option<String>,
    ) {
        self.name = name.into();
        self.description = description.into();
        if url.is_some() {
            self.url = url;
        }
    }

    /// Soft delete.
    pub fn expire(&mut self) {
        self.status = ArtifactStatus::Expired;
    }
}

/// A multiple-choice question, referenced by tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub key: ArtifactKey,
    pub description: String,
    /// The candidate answers
    pub options: Vec<String>,
    /// Index of the correct answer within `options`
    pub answer: u32,
    pub status: ArtifactStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn new(
        key: ArtifactKey,
        created_by: impl Into<String>,
        description: impl Into<String>,
        options: Vec<String>,
        answer: u32,
    ) -> Self {
        Self {
            key,
            description: description.into(),
            options,
            answer,
            status: ArtifactStatus::Active,
            created_by: created_by.into(),
            created_at: Utc::now(),
        }
    }

    pub fn update(&mut self, description: impl Into<String>, options: Vec<String>, answer: u32) {
        self.description = description.into();
        self.options = options;
        self.answer = answer;
    }

    /// Soft delete.
    pub fn expire(&mut self) {
        self.status = ArtifactStatus::Expired;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_key_roundtrips_kind() {
        let quiz = ArtifactKey::from_id(ArtifactKind::Quiz, "1");
        let question = ArtifactKey::from_id(ArtifactKind::Question, "1");
        assert_eq!(quiz.kind(), Some(ArtifactKind::Quiz));
        assert_eq!(question.kind(), Some(ArtifactKind::Question));
        assert_eq!(ArtifactKey::from_string("node:1").kind(), None);
    }

    #[test]
    fn expire_is_a_status_transition() {
        let mut quiz = Quiz::new(
            ArtifactKey::from_id(ArtifactKind::Quiz, "1"),
            "u1",
            "Fractions",
            "Practice quiz",
            None,
        );
        assert_eq!(quiz.status, ArtifactStatus::Active);
        quiz.expire();
        assert_eq!(quiz.status, ArtifactStatus::Expired);
        // the record itself survives
        assert_eq!(quiz.name, "Fractions");
    }

    #[test]
    fn status_parse_roundtrip() {
        for status in [
            ArtifactStatus::Active,
            ArtifactStatus::Draft,
            ArtifactStatus::Expired,
        ] {
            assert_eq!(ArtifactStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ArtifactStatus::parse("GONE"), None);
    }
}

//! SQLite entity store backend
//!
//! One database file, one table per entity kind, unique pair indexes as
//! the write-time serialization point for duplicate edges and tags.
//! Deliberately no foreign keys between tables: the store being modeled
//! cannot enforce cross-entity-group constraints, so referential
//! consistency lives in the engine, not the schema.

use super::traits::{EdgeInsert, EntityStore, StorageError, StorageResult, TagInsert};
use crate::graph::{
    ArtifactKey, ArtifactStatus, Edge, EdgeKey, KnowledgeNode, NodeKey, Question, Quiz, Tag,
    TagKey,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed entity store.
///
/// Thread-safe via an internal mutex on the connection. WAL mode is
/// enabled so concurrent readers are not blocked by a writer.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Initialize the database schema.
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                key TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_nodes_owner ON nodes(created_by);

            CREATE TABLE IF NOT EXISTS edges (
                key TEXT PRIMARY KEY,
                parent_key TEXT NOT NULL,
                child_key TEXT NOT NULL,
                strength REAL NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            -- The sole guard against duplicate edges; see insert_edge.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_edges_pair
                ON edges(parent_key, child_key);
            CREATE INDEX IF NOT EXISTS idx_edges_parent ON edges(parent_key);
            CREATE INDEX IF NOT EXISTS idx_edges_child ON edges(child_key);

            CREATE TABLE IF NOT EXISTS tags (
                key TEXT PRIMARY KEY,
                artifact_key TEXT NOT NULL,
                node_key TEXT NOT NULL,
                strength REAL NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_tags_pair
                ON tags(artifact_key, node_key);
            CREATE INDEX IF NOT EXISTS idx_tags_artifact ON tags(artifact_key);
            CREATE INDEX IF NOT EXISTS idx_tags_node ON tags(node_key);

            CREATE TABLE IF NOT EXISTS quizzes (
                key TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                url TEXT,
                status TEXT NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_quizzes_status ON quizzes(status);

            CREATE TABLE IF NOT EXISTS questions (
                key TEXT PRIMARY KEY,
                description TEXT NOT NULL,
                options_json TEXT NOT NULL,
                answer INTEGER NOT NULL,
                status TEXT NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_questions_status ON questions(status);

            -- Concurrent reads during writes
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn parse_ts(raw: &str) -> StorageResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| StorageError::DateParse(e.to_string()))
    }

    fn parse_status(raw: &str) -> StorageResult<ArtifactStatus> {
        ArtifactStatus::parse(raw)
            .ok_or_else(|| StorageError::InvalidRecord(format!("unknown artifact status: {raw}")))
    }

    fn row_to_node(
        key: String,
        name: String,
        description: String,
        created_by: String,
        created_at: String,
        updated_at: String,
    ) -> StorageResult<KnowledgeNode> {
        Ok(KnowledgeNode {
            key: NodeKey::from_string(key),
            name,
            description,
            created_by,
            created_at: Self::parse_ts(&created_at)?,
            updated_at: Self::parse_ts(&updated_at)?,
        })
    }

    fn row_to_edge(
        key: String,
        parent_key: String,
        child_key: String,
        strength: f64,
        created_by: String,
        created_at: String,
    ) -> StorageResult<Edge> {
        Ok(Edge {
            key: EdgeKey::from_string(key),
            parent_key: NodeKey::from_string(parent_key),
            child_key: NodeKey::from_string(child_key),
            strength,
            created_by,
            created_at: Self::parse_ts(&created_at)?,
        })
    }

    fn row_to_tag(
        key: String,
        artifact_key: String,
        node_key: String,
        strength: f64,
        created_by: String,
        created_at: String,
    ) -> StorageResult<Tag> {
        Ok(Tag {
            key: TagKey::from_string(key),
            artifact_key: ArtifactKey::from_string(artifact_key),
            node_key: NodeKey::from_string(node_key),
            strength,
            created_by,
            created_at: Self::parse_ts(&created_at)?,
        })
    }

    fn query_edge_by_endpoints(
        conn: &Connection,
        parent: &NodeKey,
        child: &NodeKey,
    ) -> StorageResult<Option<Edge>> {
        let row: Option<(String, String, String, f64, String, String)> = conn
            .query_row(
                "SELECT key, parent_key, child_key, strength, created_by, created_at
                 FROM edges WHERE parent_key = ?1 AND child_key = ?2",
                params![parent.as_str(), child.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;
        match row {
            Some((key, parent, child, strength, created_by, created_at)) => Ok(Some(
                Self::row_to_edge(key, parent, child, strength, created_by, created_at)?,
            )),
            None => Ok(None),
        }
    }

    fn query_edges(
        conn: &Connection,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> StorageResult<Vec<Edge>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;
        let mut edges = Vec::new();
        for row in rows {
            let (key, parent, child, strength, created_by, created_at) = row?;
            edges.push(Self::row_to_edge(
                key, parent, child, strength, created_by, created_at,
            )?);
        }
        Ok(edges)
    }

    fn query_tags(
        conn: &Connection,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> StorageResult<Vec<Tag>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;
        let mut tags = Vec::new();
        for row in rows {
            let (key, artifact, node, strength, created_by, created_at) = row?;
            tags.push(Self::row_to_tag(
                key, artifact, node, strength, created_by, created_at,
            )?);
        }
        Ok(tags)
    }

    fn query_nodes(
        conn: &Connection,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> StorageResult<Vec<KnowledgeNode>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;
        let mut nodes = Vec::new();
        for row in rows {
            let (key, name, description, created_by, created_at, updated_at) = row?;
            nodes.push(Self::row_to_node(
                key, name, description, created_by, created_at, updated_at,
            )?);
        }
        Ok(nodes)
    }
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn allocate_id(&self) -> StorageResult<String> {
        // The store's native identifier format; opaque to everything above.
        Ok(uuid::Uuid::new_v4().to_string())
    }

    // === Nodes ===

    async fn put_node(&self, node: &KnowledgeNode) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO nodes (key, name, description, created_by, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(key) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                updated_at = excluded.updated_at
            "#,
            params![
                node.key.as_str(),
                node.name,
                node.description,
                node.created_by,
                node.created_at.to_rfc3339(),
                node.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn get_node(&self, key: &NodeKey) -> StorageResult<Option<KnowledgeNode>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(String, String, String, String, String, String)> = conn
            .query_row(
                "SELECT key, name, description, created_by, created_at, updated_at
                 FROM nodes WHERE key = ?1",
                params![key.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;
        match row {
            Some((key, name, description, created_by, created_at, updated_at)) => Ok(Some(
                Self::row_to_node(key, name, description, created_by, created_at, updated_at)?,
            )),
            None => Ok(None),
        }
    }

    async fn delete_node(&self, key: &NodeKey) -> StorageResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM nodes WHERE key = ?1", params![key.as_str()])?;
        Ok(rows > 0)
    }

    async fn nodes_by_owner(
        &self,
        owner: &str,
        limit: usize,
    ) -> StorageResult<Vec<KnowledgeNode>> {
        let conn = self.conn.lock().unwrap();
        Self::query_nodes(
            &conn,
            "SELECT key, name, description, created_by, created_at, updated_at
             FROM nodes WHERE created_by = ?1 LIMIT ?2",
            &[&owner, &(limit as i64)],
        )
    }

    async fn list_nodes(&self, limit: usize) -> StorageResult<Vec<KnowledgeNode>> {
        let conn = self.conn.lock().unwrap();
        Self::query_nodes(
            &conn,
            "SELECT key, name, description, created_by, created_at, updated_at
             FROM nodes LIMIT ?1",
            &[&(limit as i64)],
        )
    }

    // === Edges ===

    async fn insert_edge(&self, edge: &Edge) -> StorageResult<EdgeInsert> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            r#"
            INSERT INTO edges (key, parent_key, child_key, strength, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(parent_key, child_key) DO NOTHING
            "#,
            params![
                edge.key.as_str(),
                edge.parent_key.as_str(),
                edge.child_key.as_str(),
                edge.strength,
                edge.created_by,
                edge.created_at.to_rfc3339(),
            ],
        )?;
        if inserted > 0 {
            return Ok(EdgeInsert::Created(edge.clone()));
        }
        match Self::query_edge_by_endpoints(&conn, &edge.parent_key, &edge.child_key)? {
            Some(existing) => Ok(EdgeInsert::Existing(existing)),
            // Winner was deleted between our insert and the read; retryable.
            None => Err(StorageError::Busy(
                "edge pair vanished during insert".to_string(),
            )),
        }
    }

    async fn get_edge(&self, key: &EdgeKey) -> StorageResult<Option<Edge>> {
        let conn = self.conn.lock().unwrap();
        let edges = Self::query_edges(
            &conn,
            "SELECT key, parent_key, child_key, strength, created_by, created_at
             FROM edges WHERE key = ?1",
            &[&key.as_str()],
        )?;
        Ok(edges.into_iter().next())
    }

    async fn edge_by_endpoints(
        &self,
        parent: &NodeKey,
        child: &NodeKey,
    ) -> StorageResult<Option<Edge>> {
        let conn = self.conn.lock().unwrap();
        Self::query_edge_by_endpoints(&conn, parent, child)
    }

    async fn edges_by_parent(&self, key: &NodeKey) -> StorageResult<Vec<Edge>> {
        let conn = self.conn.lock().unwrap();
        Self::query_edges(
            &conn,
            "SELECT key, parent_key, child_key, strength, created_by, created_at
             FROM edges WHERE parent_key = ?1",
            &[&key.as_str()],
        )
    }

    async fn edges_by_child(&self, key: &NodeKey) -> StorageResult<Vec<Edge>> {
        let conn = self.conn.lock().unwrap();
        Self::query_edges(
            &conn,
            "SELECT key, parent_key, child_key, strength, created_by, created_at
             FROM edges WHERE child_key = ?1",
            &[&key.as_str()],
        )
    }

    async fn delete_edge(&self, key: &EdgeKey) -> StorageResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM edges WHERE key = ?1", params![key.as_str()])?;
        Ok(rows > 0)
    }

    async fn list_edges(&self, limit: usize) -> StorageResult<Vec<Edge>> {
        let conn = self.conn.lock().unwrap();
        Self::query_edges(
            &conn,
            "SELECT key, parent_key, child_key, strength, created_by, created_at
             FROM edges LIMIT ?1",
            &[&(limit as i64)],
        )
    }

    // === Tags ===

    async fn insert_tag(&self, tag: &Tag) -> StorageResult<TagInsert> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            r#"
            INSERT INTO tags (key, artifact_key, node_key, strength, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(artifact_key, node_key) DO NOTHING
            "#,
            params![
                tag.key.as_str(),
                tag.artifact_key.as_str(),
                tag.node_key.as_str(),
                tag.strength,
                tag.created_by,
                tag.created_at.to_rfc3339(),
            ],
        )?;
        if inserted > 0 {
            return Ok(TagInsert::Created(tag.clone()));
        }
        let existing = Self::query_tags(
            &conn,
            "SELECT key, artifact_key, node_key, strength, created_by, created_at
             FROM tags WHERE artifact_key = ?1 AND node_key = ?2",
            &[&tag.artifact_key.as_str(), &tag.node_key.as_str()],
        )?;
        match existing.into_iter().next() {
            Some(tag) => Ok(TagInsert::Existing(tag)),
            None => Err(StorageError::Busy(
                "tag pair vanished during insert".to_string(),
            )),
        }
    }

    async fn get_tag(&self, key: &TagKey) -> StorageResult<Option<Tag>> {
        let conn = self.conn.lock().unwrap();
        let tags = Self::query_tags(
            &conn,
            "SELECT key, artifact_key, node_key, strength, created_by, created_at
             FROM tags WHERE key = ?1",
            &[&key.as_str()],
        )?;
        Ok(tags.into_iter().next())
    }

    async fn tag_by_pair(
        &self,
        artifact: &ArtifactKey,
        node: &NodeKey,
    ) -> StorageResult<Option<Tag>> {
        let conn = self.conn.lock().unwrap();
        let tags = Self::query_tags(
            &conn,
            "SELECT key, artifact_key, node_key, strength, created_by, created_at
             FROM tags WHERE artifact_key = ?1 AND node_key = ?2",
            &[&artifact.as_str(), &node.as_str()],
        )?;
        Ok(tags.into_iter().next())
    }

    async fn put_tag(&self, tag: &Tag) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO tags (key, artifact_key, node_key, strength, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(key) DO UPDATE SET
                artifact_key = excluded.artifact_key,
                node_key = excluded.node_key
            "#,
            params![
                tag.key.as_str(),
                tag.artifact_key.as_str(),
                tag.node_key.as_str(),
                tag.strength,
                tag.created_by,
                tag.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(f, _)
                if f.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::Constraint("tag pair already bound".to_string())
            }
            other => StorageError::Database(other),
        })?;
        Ok(())
    }

    async fn tags_by_artifact(
        &self,
        key: &ArtifactKey,
        limit: usize,
    ) -> StorageResult<Vec<Tag>> {
        let conn = self.conn.lock().unwrap();
        Self::query_tags(
            &conn,
            "SELECT key, artifact_key, node_key, strength, created_by, created_at
             FROM tags WHERE artifact_key = ?1 LIMIT ?2",
            &[&key.as_str(), &(limit as i64)],
        )
    }

    async fn tags_by_node(&self, key: &NodeKey) -> StorageResult<Vec<Tag>> {
        let conn = self.conn.lock().unwrap();
        Self::query_tags(
            &conn,
            "SELECT key, artifact_key, node_key, strength, created_by, created_at
             FROM tags WHERE node_key = ?1",
            &[&key.as_str()],
        )
    }

    async fn delete_tag(&self, key: &TagKey) -> StorageResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM tags WHERE key = ?1", params![key.as_str()])?;
        Ok(rows > 0)
    }

    async fn list_tags(&self, limit: usize) -> StorageResult<Vec<Tag>> {
        let conn = self.conn.lock().unwrap();
        Self::query_tags(
            &conn,
            "SELECT key, artifact_key, node_key, strength, created_by, created_at
             FROM tags LIMIT ?1",
            &[&(limit as i64)],
        )
    }

    // === Artifacts ===

    async fn put_quiz(&self, quiz: &Quiz) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO quizzes (key, name, description, url, status, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(key) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                url = excluded.url,
                status = excluded.status
            "#,
            params![
                quiz.key.as_str(),
                quiz.name,
                quiz.description,
                quiz.url,
                quiz.status.as_str(),
                quiz.created_by,
                quiz.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn get_quiz(&self, key: &ArtifactKey) -> StorageResult<Option<Quiz>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(String, String, String, Option<String>, String, String, String)> = conn
            .query_row(
                "SELECT key, name, description, url, status, created_by, created_at
                 FROM quizzes WHERE key = ?1",
                params![key.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )
            .optional()?;
        match row {
            Some((key, name, description, url, status, created_by, created_at)) => Ok(Some(Quiz {
                key: ArtifactKey::from_string(key),
                name,
                description,
                url,
                status: Self::parse_status(&status)?,
                created_by,
                created_at: Self::parse_ts(&created_at)?,
            })),
            None => Ok(None),
        }
    }

    async fn quizzes_by_status(
        &self,
        status: ArtifactStatus,
        limit: usize,
    ) -> StorageResult<Vec<Quiz>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT key, name, description, url, status, created_by, created_at
             FROM quizzes WHERE status = ?1 LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![status.as_str(), limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;
        let mut quizzes = Vec::new();
        for row in rows {
            let (key, name, description, url, status, created_by, created_at) = row?;
            quizzes.push(Quiz {
                key: ArtifactKey::from_string(key),
                name,
                description,
                url,
                status: Self::parse_status(&status)?,
                created_by,
                created_at: Self::parse_ts(&created_at)?,
            });
        }
        Ok(quizzes)
    }

    async fn put_question(&self, question: &Question) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        let options_json = serde_json::to_string(&question.options)?;
        conn.execute(
            r#"
            INSERT INTO questions (key, description, options_json, answer, status, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(key) DO UPDATE SET
                description = excluded.description,
                options_json = excluded.options_json,
                answer = excluded.answer,
                status = excluded.status
            "#,
            params![
                question.key.as_str(),
                question.description,
                options_json,
                question.answer,
                question.status.as_str(),
                question.created_by,
                question.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn get_question(&self, key: &ArtifactKey) -> StorageResult<Option<Question>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(String, String, String, u32, String, String, String)> = conn
            .query_row(
                "SELECT key, description, options_json, answer, status, created_by, created_at
                 FROM questions WHERE key = ?1",
                params![key.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )
            .optional()?;
        match row {
            Some((key, description, options_json, answer, status, created_by, created_at)) => {
                Ok(Some(Question {
                    key: ArtifactKey::from_string(key),
                    description,
                    options: serde_json::from_str(&options_json)?,
                    answer,
                    status: Self::parse_status(&status)?,
                    created_by,
                    created_at: Self::parse_ts(&created_at)?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn questions_by_status(
        &self,
        status: ArtifactStatus,
        limit: usize,
    ) -> StorageResult<Vec<Question>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT key, description, options_json, answer, status, created_by, created_at
             FROM questions WHERE status = ?1 LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![status.as_str(), limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;
        let mut questions = Vec::new();
        for row in rows {
            let (key, description, options_json, answer, status, created_by, created_at) = row?;
            questions.push(Question {
                key: ArtifactKey::from_string(key),
                description,
                options: serde_json::from_str(&options_json)?,
                answer,
                status: Self::parse_status(&status)?,
                created_by,
                created_at: Self::parse_ts(&created_at)?,
            });
        }
        Ok(questions)
    }
}

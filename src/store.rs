use crate::errors::{Error, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// One (content record, remote project) pairing with the last-known status
/// snapshot. Created at launch, updated only by the callback handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub content_id: i64,
    pub project_id: i64,
    pub status: String,
    pub translation_pct: u8,
    pub proofreading_pct: u8,
    pub created_at: String,
}

/// Persistent mapping of content records to remote translation projects.
///
/// Sandbox and production rows live in separate tables so an environment
/// switch never mixes project ids.
#[derive(Clone)]
pub struct ProjectStore {
    conn: Arc<Mutex<Connection>>,
    table: &'static str,
}

impl ProjectStore {
    /// Open (or create) the store at `database_path`.
    pub fn new(database_path: &str, sandbox: bool) -> Result<Self> {
        let conn = Connection::open(database_path)?;
        let table = if sandbox { "sandbox_projects" } else { "projects" };

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    content_id INTEGER NOT NULL,
                    project_id INTEGER NOT NULL,
                    status TEXT NOT NULL DEFAULT 'started',
                    translation_pct INTEGER NOT NULL DEFAULT 0,
                    proofreading_pct INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    PRIMARY KEY (content_id, project_id)
                )"
            ),
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table,
        })
    }

    /// In-memory store, useful for tests.
    pub fn in_memory(sandbox: bool) -> Result<Self> {
        Self::new(":memory:", sandbox)
    }

    /// Record that `project_id` covers `content_id`. Idempotent: repeating
    /// the same pair leaves exactly one row.
    pub fn add_project(&self, content_id: i64, project_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (content_id, project_id, status, translation_pct, proofreading_pct, created_at)
                 VALUES (?1, ?2, 'started', 0, 0, ?3)",
                self.table
            ),
            params![content_id, project_id, now],
        )?;

        Ok(())
    }

    /// All project records for a content record, in insertion order. Empty
    /// means "not yet submitted", which is not an error.
    pub fn get_projects(&self, content_id: i64) -> Result<Vec<ProjectRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT content_id, project_id, status, translation_pct, proofreading_pct, created_at
             FROM {}
             WHERE content_id = ?1
             ORDER BY rowid ASC",
            self.table
        ))?;

        let records = stmt
            .query_map(params![content_id], |row| {
                Ok(ProjectRecord {
                    content_id: row.get(0)?,
                    project_id: row.get(1)?,
                    status: row.get(2)?,
                    translation_pct: row.get::<_, i64>(3)? as u8,
                    proofreading_pct: row.get::<_, i64>(4)? as u8,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Reverse lookup used by the callback handler: which content record does
    /// this remote project belong to?
    pub fn get_content_id(&self, project_id: i64) -> Result<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT content_id FROM {} WHERE project_id = ?1 LIMIT 1",
            self.table
        ))?;

        let content_id = stmt
            .query_row(params![project_id], |row| row.get(0))
            .optional()?;

        Ok(content_id)
    }

    /// Overwrite status and percentages for every record of `content_id` in
    /// one statement. Callback handler only.
    pub fn update_project(
        &self,
        content_id: i64,
        status: &str,
        translation_pct: u8,
        proofreading_pct: u8,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET status = ?2, translation_pct = ?3, proofreading_pct = ?4
                 WHERE content_id = ?1",
                self.table
            ),
            params![content_id, status, translation_pct, proofreading_pct],
        )?;

        if updated == 0 {
            return Err(Error::Validation(format!(
                "no project record for content {content_id}"
            )));
        }

        Ok(())
    }

    /// Drop every record of a content record. Used when a freshly created
    /// language variant inherited records from its source.
    pub fn delete_project(&self, content_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("DELETE FROM {} WHERE content_id = ?1", self.table),
            params![content_id],
        )?;
        Ok(())
    }
}

//! Session records persisted in SQLite.

use anyhow::{Context, Result};
use async_trait::async_trait;
use frscope::session::SessionStore;
use frscope::{FrError, SessionId, SessionRecord};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// One row per session; the record is stored as JSON.
pub struct SqliteStore {
    db: Mutex<Connection>,
}

/// Summary row for listings.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub filename: String,
    pub created_at: String,
}

fn storage_err(e: impl std::fmt::Display) -> FrError {
    FrError::Storage(e.to_string())
}

impl SqliteStore {
    /// Open or create a session database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let db = Connection::open(path)
            .with_context(|| format!("failed to open session store: {}", path.display()))?;

        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                record TEXT NOT NULL,
                created_at TEXT NOT NULL
            );",
        )
        .context("failed to create sessions table")?;

        Ok(Self { db: Mutex::new(db) })
    }

    /// Store backed by a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::open(Path::new(":memory:"))
    }

    /// All sessions, oldest first.
    pub fn summaries(&self) -> Result<Vec<SessionSummary>> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        let mut stmt =
            db.prepare("SELECT id, filename, created_at FROM sessions ORDER BY created_at, id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SessionSummary {
                    id: row.get(0)?,
                    filename: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Remove a session. Returns whether a row was deleted.
    pub fn delete(&self, id: &SessionId) -> Result<bool> {
        let db = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        let rows = db.execute(
            "DELETE FROM sessions WHERE id = ?1",
            rusqlite::params![id.as_str()],
        )?;
        Ok(rows > 0)
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn put(&self, id: &SessionId, record: &SessionRecord) -> frscope::Result<()> {
        let json = serde_json::to_string(record).map_err(storage_err)?;
        let db = self.db.lock().map_err(storage_err)?;
        db.execute(
            "INSERT OR REPLACE INTO sessions (id, filename, record, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                id.as_str(),
                record.filename,
                json,
                record.created_at.to_rfc3339()
            ],
        )
        .map_err(storage_err)?;
        debug!("persisted {id} ({} bytes)", json.len());
        Ok(())
    }

    async fn get(&self, id: &SessionId) -> frscope::Result<Option<SessionRecord>> {
        let json: Option<String> = {
            let db = self.db.lock().map_err(storage_err)?;
            db.query_row(
                "SELECT record FROM sessions WHERE id = ?1",
                rusqlite::params![id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage_err)?
        };
        json.map(|j| serde_json::from_str(&j).map_err(storage_err))
            .transpose()
    }

    async fn ids(&self) -> frscope::Result<Vec<SessionId>> {
        let db = self.db.lock().map_err(storage_err)?;
        let mut stmt = db
            .prepare("SELECT id FROM sessions ORDER BY created_at, id")
            .map_err(storage_err)?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(storage_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage_err)?;
        Ok(ids.into_iter().map(SessionId::from).collect())
    }
}

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::{Connection, Row, params};

use super::models::{Confab, ConfabStatus};

/// Async-safe handle to the confab database.
///
/// Wraps `ConfabDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, keeping synchronous SQLite
/// I/O off the async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<ConfabDb>>,
}

impl DbHandle {
    pub fn new(db: ConfabDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&ConfabDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("DB task panicked")?
    }
}

pub struct ConfabDb {
    conn: Connection,
}

const CONFAB_COLUMNS: &str =
    "id, name, description, version, status, configuration, github_url, created_at, updated_at";

impl ConfabDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS confabs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    version TEXT NOT NULL DEFAULT '1.0.0',
                    status TEXT NOT NULL DEFAULT 'draft',
                    configuration TEXT,
                    github_url TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                );
                ",
            )
            .context("Failed to create confabs table")?;
        Ok(())
    }

    fn row_to_confab(row: &Row<'_>) -> rusqlite::Result<Confab> {
        let status: String = row.get(4)?;
        let configuration: Option<String> = row.get(5)?;
        Ok(Confab {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            version: row.get(3)?,
            status: ConfabStatus::from_str(&status).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?,
            configuration: configuration
                .map(|raw| {
                    serde_json::from_str(&raw).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            5,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })
                })
                .transpose()?,
            github_url: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    // ── Confab CRUD ───────────────────────────────────────────────────

    pub fn create_confab(
        &self,
        name: &str,
        description: &str,
        configuration: Option<&serde_json::Value>,
    ) -> Result<Confab> {
        let configuration = configuration.map(serde_json::Value::to_string);
        self.conn
            .execute(
                "INSERT INTO confabs (name, description, configuration) VALUES (?1, ?2, ?3)",
                params![name, description, configuration],
            )
            .context("Failed to insert confab")?;
        let id = self.conn.last_insert_rowid();
        self.get_confab(id)?
            .context("Confab not found after insert")
    }

    pub fn list_confabs(&self) -> Result<Vec<Confab>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {CONFAB_COLUMNS} FROM confabs ORDER BY id"
            ))
            .context("Failed to prepare list_confabs")?;
        let rows = stmt
            .query_map([], Self::row_to_confab)
            .context("Failed to query confabs")?;
        let mut confabs = Vec::new();
        for row in rows {
            confabs.push(row.context("Failed to read confab row")?);
        }
        Ok(confabs)
    }

    pub fn get_confab(&self, id: i64) -> Result<Option<Confab>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {CONFAB_COLUMNS} FROM confabs WHERE id = ?1"
            ))
            .context("Failed to prepare get_confab")?;
        let mut rows = stmt
            .query_map(params![id], Self::row_to_confab)
            .context("Failed to query confab")?;
        match rows.next() {
            Some(row) => Ok(Some(row.context("Failed to read confab row")?)),
            None => Ok(None),
        }
    }

    pub fn update_confab(
        &self,
        id: i64,
        name: &str,
        description: &str,
        configuration: Option<&serde_json::Value>,
        version: &str,
    ) -> Result<Confab> {
        let configuration = configuration.map(serde_json::Value::to_string);
        self.conn
            .execute(
                "UPDATE confabs
                 SET name = ?1, description = ?2, configuration = ?3, version = ?4,
                     updated_at = datetime('now')
                 WHERE id = ?5",
                params![name, description, configuration, version, id],
            )
            .context("Failed to update confab")?;
        self.get_confab(id)?
            .context("Confab not found after update")
    }

    pub fn set_github_url(&self, id: i64, github_url: &str) -> Result<Confab> {
        self.conn
            .execute(
                "UPDATE confabs SET github_url = ?1 WHERE id = ?2",
                params![github_url, id],
            )
            .context("Failed to set confab github_url")?;
        self.get_confab(id)?
            .context("Confab not found after github_url update")
    }

    /// Returns false when no row with that id existed.
    pub fn delete_confab(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM confabs WHERE id = ?1", params![id])
            .context("Failed to delete confab")?;
        Ok(changed > 0)
    }
}

//! SQLite document store connection.
//!
//! One connection is shared behind a tokio mutex and every statement runs on
//! the blocking pool. Schema steps are applied once each, tracked with
//! `PRAGMA user_version`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;
use thiserror::Error;
use tokio::sync::Mutex;

use super::schema;

/// Errors from the document store.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Stored embedding is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Schema step {step} failed: {source}")]
    Migration {
        step: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Cannot create database directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database task failed: {0}")]
    TaskFailed(String),
}

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Shared handle to the articles and press releases database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database file, creating parent directories.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        Self::init(move || {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|source| DatabaseError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            let conn = Connection::open(&path)?;
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            Ok(conn)
        })
        .await
    }

    /// Opens a private in-memory database.
    pub async fn open_in_memory() -> Result<Self> {
        Self::init(|| Ok(Connection::open_in_memory()?)).await
    }

    async fn init<F>(connect: F) -> Result<Self>
    where
        F: FnOnce() -> Result<Connection> + Send + 'static,
    {
        let conn = tokio::task::spawn_blocking(move || {
            let conn = connect()?;
            apply_schema(&conn)?;
            Ok::<_, DatabaseError>(conn)
        })
        .await
        .map_err(|e| DatabaseError::TaskFailed(e.to_string()))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    pub async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |conn| f(conn)).await
    }

    /// Runs `f` inside a transaction that commits only if `f` succeeds.
    ///
    /// Seeding uses this so a bad record leaves no partial batch behind.
    pub async fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |conn| {
            let tx = conn.transaction()?;
            let out = f(&tx)?;
            tx.commit()?;
            Ok(out)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || f(&mut *conn.blocking_lock()))
            .await
            .map_err(|e| DatabaseError::TaskFailed(e.to_string()))?
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

/// Applies the schema steps newer than the stored `user_version`.
fn apply_schema(conn: &Connection) -> Result<()> {
    let applied: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    let steps = schema::all_migrations();

    for (index, sql) in steps.iter().enumerate().skip(applied.max(0) as usize) {
        let step = index + 1;
        conn.execute_batch(sql)
            .map_err(|source| DatabaseError::Migration { step, source })?;
        conn.execute_batch(&format!("PRAGMA user_version = {}", step))?;
    }
    Ok(())
}

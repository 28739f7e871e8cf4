use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::migrations;

/// Shared SQLite handle for the tier-2 cache, canonical job metadata and keyword index.
///
/// One connection behind a mutex; async callers go through [`Database::call`], which
/// runs the closure on the blocking pool.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Opens (creating if needed) the database at `path` and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(StorageError::InvalidPath {
                path: path.display().to_string(),
            });
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let db = Self::init(conn, Some(path.to_path_buf()))?;
        debug!(path = %path.display(), "Opened database");
        Ok(db)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(mut conn: Connection, path: Option<PathBuf>) -> StorageResult<Self> {
        Self::configure_pragmas(&conn)?;
        migrations::run_migrations(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    fn configure_pragmas(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn schema_version(&self) -> StorageResult<u32> {
        self.with_conn(|conn| conn.query_row("PRAGMA user_version", [], |row| row.get(0)))
    }

    /// Runs `f` on the calling thread. Keep it short; it holds the connection lock.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> StorageResult<T> {
        let mut conn = self.conn.lock();
        Ok(f(&mut conn)?)
    }

    /// Runs `f` on tokio's blocking pool.
    pub async fn call<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            f(&mut conn)
        })
        .await
        .map_err(|e| StorageError::Task {
            reason: e.to_string(),
        })?
        .map_err(StorageError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("jobmatch.db");

        let db = Database::open(&db_path).unwrap();

        assert!(db_path.exists());
        assert_eq!(db.schema_version().unwrap(), migrations::SCHEMA_VERSION);
        assert_eq!(db.path(), Some(db_path.as_path()));
    }

    #[test]
    fn test_wal_mode_enabled() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db")).unwrap();
        let mode: String = db
            .with_conn(|conn| conn.query_row("PRAGMA journal_mode;", [], |row| row.get(0)))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        drop(Database::open(&path).unwrap());

        let db = Database::open(&path).unwrap();
        assert_eq!(db.schema_version().unwrap(), migrations::SCHEMA_VERSION);
    }

    #[test]
    fn test_directory_path_rejected() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Database::open(dir.path()),
            Err(StorageError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_all_tables_created() {
        let db = Database::open_in_memory().unwrap();
        for table in ["cache_entries", "canonical_jobs", "job_links", "job_keywords"] {
            let exists: i32 = db
                .with_conn(|conn| {
                    conn.query_row(
                        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                        [table],
                        |row| row.get(0),
                    )
                })
                .unwrap();
            assert_eq!(exists, 1, "Table {} should exist", table);
        }
    }

    #[tokio::test]
    async fn test_call_runs_on_blocking_pool() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |r| r.get(0)))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}

use rusqlite::Connection;
use tracing::info;

use super::error::StorageResult;

/// Ordered schema steps. `PRAGMA user_version` records how many have been applied.
const MIGRATIONS: &[&str] = &[
    // 1: tier-2 cache
    "CREATE TABLE IF NOT EXISTS cache_entries (
        cache_key  TEXT PRIMARY KEY,
        scope      TEXT,
        namespace  TEXT NOT NULL,
        value      BLOB NOT NULL,
        updated_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_cache_entries_scope ON cache_entries(scope);",
    // 2: canonical job metadata and per-record links
    "CREATE TABLE IF NOT EXISTS canonical_jobs (
        identity_hash    TEXT PRIMARY KEY,
        canonical_job_id TEXT NOT NULL,
        first_seen       INTEGER NOT NULL,
        last_seen        INTEGER NOT NULL,
        duplicate_count  INTEGER NOT NULL DEFAULT 1
    );
    CREATE TABLE IF NOT EXISTS job_links (
        job_id           TEXT PRIMARY KEY,
        identity_hash    TEXT NOT NULL REFERENCES canonical_jobs(identity_hash),
        canonical_job_id TEXT NOT NULL,
        linked_at        INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_job_links_identity ON job_links(identity_hash);",
    // 3: keyword index
    "CREATE VIRTUAL TABLE IF NOT EXISTS job_keywords USING fts5(
        job_id UNINDEXED,
        user_id UNINDEXED,
        title,
        company,
        location,
        description,
        skills,
        tokenize = 'porter unicode61'
    );",
    // 4: tier-2 expiry; rows written before this step read as expired
    "ALTER TABLE cache_entries ADD COLUMN expires_at INTEGER NOT NULL DEFAULT 0;
    CREATE INDEX IF NOT EXISTS idx_cache_entries_expiry ON cache_entries(expires_at);",
];

pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;

/// Applies pending migrations and returns the resulting schema version.
pub fn run_migrations(conn: &mut Connection) -> StorageResult<u32> {
    let current: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let version = idx as u32 + 1;
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        info!(version, "Applied schema migration");
    }

    Ok(current.max(SCHEMA_VERSION))
}

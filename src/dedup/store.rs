use std::future::Future;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::model::CanonicalJobMetadata;
use crate::storage::Database;

use super::error::DedupResult;
use super::identity::IdentityHash;

/// Result of linking one job record to its canonical job.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub metadata: CanonicalJobMetadata,
    /// The incoming record created the canonical row.
    pub is_new_canonical: bool,
    /// The record had been registered before; nothing was counted.
    pub already_linked: bool,
}

/// Owner of canonical job metadata.
///
/// `register` must be atomic: two concurrent registrations of the same identity produce
/// exactly one canonical row, and the loser is counted as a duplicate.
pub trait CanonicalStore: Send + Sync + 'static {
    fn register(
        &self,
        identity: &IdentityHash,
        job_id: &str,
        seen_at: DateTime<Utc>,
    ) -> impl Future<Output = DedupResult<Registration>> + Send;

    fn metadata(
        &self,
        identity: &IdentityHash,
    ) -> impl Future<Output = DedupResult<Option<CanonicalJobMetadata>>> + Send;

    /// Canonical job id a record was linked to, if it was ever ingested.
    fn canonical_for_job(
        &self,
        job_id: &str,
    ) -> impl Future<Output = DedupResult<Option<String>>> + Send;
}

/// SQLite-backed store. `register` is a single IMMEDIATE transaction built around an
/// `INSERT .. ON CONFLICT DO UPDATE .. RETURNING` on the identity hash.
#[derive(Debug, Clone)]
pub struct SqliteCanonicalStore {
    db: Database,
}

impl SqliteCanonicalStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn read_metadata(conn: &Connection, identity: &str) -> rusqlite::Result<Option<CanonicalJobMetadata>> {
    conn.query_row(
        "SELECT canonical_job_id, first_seen, last_seen, duplicate_count
         FROM canonical_jobs WHERE identity_hash = ?1",
        [identity],
        |row| {
            Ok(CanonicalJobMetadata {
                identity_hash: identity.to_string(),
                canonical_job_id: row.get(0)?,
                first_seen: millis_to_datetime(row.get(1)?),
                last_seen: millis_to_datetime(row.get(2)?),
                duplicate_count: row.get::<_, i64>(3)?.max(0) as u64,
            })
        },
    )
    .optional()
}

fn register_in_tx(
    conn: &mut Connection,
    identity: &str,
    job_id: &str,
    seen_ms: i64,
) -> rusqlite::Result<Registration> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let linked: Option<String> = tx
        .query_row(
            "SELECT identity_hash FROM job_links WHERE job_id = ?1",
            [job_id],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(linked_identity) = linked {
        tx.execute(
            "UPDATE canonical_jobs SET last_seen = max(last_seen, ?2) WHERE identity_hash = ?1",
            params![linked_identity, seen_ms],
        )?;
        let metadata = read_metadata(&tx, &linked_identity)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        return Ok(Registration {
            metadata,
            is_new_canonical: false,
            already_linked: true,
        });
    }

    let (canonical_job_id, first_seen, last_seen, count): (String, i64, i64, i64) = tx.query_row(
        "INSERT INTO canonical_jobs (identity_hash, canonical_job_id, first_seen, last_seen, duplicate_count)
         VALUES (?1, ?2, ?3, ?3, 1)
         ON CONFLICT(identity_hash) DO UPDATE SET
            duplicate_count = duplicate_count + 1,
            last_seen = max(last_seen, excluded.last_seen)
         RETURNING canonical_job_id, first_seen, last_seen, duplicate_count",
        params![identity, job_id, seen_ms],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
    )?;

    tx.execute(
        "INSERT INTO job_links (job_id, identity_hash, canonical_job_id, linked_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![job_id, identity, canonical_job_id, seen_ms],
    )?;
    tx.commit()?;

    let is_new_canonical = canonical_job_id == job_id;
    Ok(Registration {
        metadata: CanonicalJobMetadata {
            identity_hash: identity.to_string(),
            canonical_job_id,
            first_seen: millis_to_datetime(first_seen),
            last_seen: millis_to_datetime(last_seen),
            duplicate_count: count.max(0) as u64,
        },
        is_new_canonical,
        already_linked: false,
    })
}

impl CanonicalStore for SqliteCanonicalStore {
    async fn register(
        &self,
        identity: &IdentityHash,
        job_id: &str,
        seen_at: DateTime<Utc>,
    ) -> DedupResult<Registration> {
        let identity = identity.as_str().to_string();
        let job_id = job_id.to_string();
        let seen_ms = seen_at.timestamp_millis();

        let registration = self
            .db
            .call(move |conn| register_in_tx(conn, &identity, &job_id, seen_ms))
            .await?;
        Ok(registration)
    }

    async fn metadata(&self, identity: &IdentityHash) -> DedupResult<Option<CanonicalJobMetadata>> {
        let identity = identity.as_str().to_string();
        let metadata = self
            .db
            .call(move |conn| read_metadata(conn, &identity))
            .await?;
        Ok(metadata)
    }

    async fn canonical_for_job(&self, job_id: &str) -> DedupResult<Option<String>> {
        let job_id = job_id.to_string();
        let canonical = self
            .db
            .call(move |conn| {
                conn.query_row(
                    "SELECT canonical_job_id FROM job_links WHERE job_id = ?1",
                    [&job_id],
                    |row| row.get(0),
                )
                .optional()
            })
            .await?;
        Ok(canonical)
    }
}

//! Tier 2: durable SQLite store. Authoritative until an entry's TTL runs out.

use std::future::Future;
use std::time::Duration;

use rusqlite::{OptionalExtension, params};
use tracing::debug;

use crate::storage::{Database, now_millis};

use super::error::CacheResult;
use super::types::CacheKey;

/// A live tier-2 value and how long it has left.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier2Entry {
    pub value: Vec<u8>,
    pub remaining: Duration,
}

/// Durable key-value store with exact lookup and bulk delete by scope.
pub trait Tier2Store: Send + Sync + 'static {
    /// Expired entries read as `None`.
    fn get(&self, key: &str) -> impl Future<Output = CacheResult<Option<Tier2Entry>>> + Send;

    /// Inserts or overwrites `key` (last write wins); the TTL restarts on overwrite.
    fn put(
        &self,
        key: &CacheKey,
        value: Vec<u8>,
        ttl: Duration,
    ) -> impl Future<Output = CacheResult<()>> + Send;

    /// Returns `true` when a row was removed.
    fn delete(&self, key: &str) -> impl Future<Output = CacheResult<bool>> + Send;

    fn keys_in_scope(&self, scope: &str) -> impl Future<Output = CacheResult<Vec<String>>> + Send;

    /// Deletes every entry in `scope` and returns how many were removed.
    fn delete_scope(&self, scope: &str) -> impl Future<Output = CacheResult<u64>> + Send;
}

fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone)]
pub struct SqliteTier2Store {
    db: Database,
}

impl SqliteTier2Store {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Deletes every expired row and returns how many went.
    pub async fn prune_expired(&self) -> CacheResult<u64> {
        let now = now_millis();
        let removed = self
            .db
            .call(move |conn| {
                conn.execute("DELETE FROM cache_entries WHERE expires_at <= ?1", [now])
            })
            .await?;
        Ok(removed as u64)
    }
}

impl Tier2Store for SqliteTier2Store {
    async fn get(&self, key: &str) -> CacheResult<Option<Tier2Entry>> {
        let key = key.to_string();
        let now = now_millis();
        let entry = self
            .db
            .call(move |conn| {
                conn.query_row(
                    "SELECT value, expires_at FROM cache_entries
                     WHERE cache_key = ?1 AND expires_at > ?2",
                    params![key, now],
                    |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()
            })
            .await?;

        Ok(entry.map(|(value, expires_at)| Tier2Entry {
            value,
            remaining: Duration::from_millis(expires_at.saturating_sub(now).max(0) as u64),
        }))
    }

    /// Also drops rows that have already expired, so the table does not grow unbounded.
    async fn put(&self, key: &CacheKey, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        let cache_key = key.as_str().to_string();
        let scope = key.scope().map(str::to_string);
        let namespace = key.namespace().as_str();
        let now = now_millis();
        let expires_at = now.saturating_add(ttl_millis(ttl));

        let pruned = self
            .db
            .call(move |conn| {
                let pruned =
                    conn.execute("DELETE FROM cache_entries WHERE expires_at <= ?1", [now])?;
                conn.execute(
                    "INSERT INTO cache_entries (cache_key, scope, namespace, value, updated_at, expires_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(cache_key) DO UPDATE SET
                        scope = excluded.scope,
                        namespace = excluded.namespace,
                        value = excluded.value,
                        updated_at = excluded.updated_at,
                        expires_at = excluded.expires_at",
                    params![cache_key, scope, namespace, value, now, expires_at],
                )?;
                Ok(pruned)
            })
            .await?;
        if pruned > 0 {
            debug!(pruned, "Pruned expired tier-2 entries");
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let key = key.to_string();
        let removed = self
            .db
            .call(move |conn| conn.execute("DELETE FROM cache_entries WHERE cache_key = ?1", [&key]))
            .await?;
        Ok(removed > 0)
    }

    async fn keys_in_scope(&self, scope: &str) -> CacheResult<Vec<String>> {
        let scope = scope.to_string();
        let keys = self
            .db
            .call(move |conn| {
                let mut stmt = conn
                    .prepare_cached("SELECT cache_key FROM cache_entries WHERE scope = ?1")?;
                let rows = stmt.query_map([&scope], |row| row.get::<_, String>(0))?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await?;
        Ok(keys)
    }

    async fn delete_scope(&self, scope: &str) -> CacheResult<u64> {
        let owned = scope.to_string();
        let removed = self
            .db
            .call(move |conn| conn.execute("DELETE FROM cache_entries WHERE scope = ?1", [&owned]))
            .await?;
        debug!(scope, removed, "Deleted tier-2 scope");
        Ok(removed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    fn store() -> SqliteTier2Store {
        SqliteTier2Store::new(Database::open_in_memory().unwrap())
    }

    async fn value_of(store: &SqliteTier2Store, key: &str) -> Option<Vec<u8>> {
        store.get(key).await.unwrap().map(|e| e.value)
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = store();
        let key = CacheKey::analysis("u1", "j1");

        store.put(&key, b"first".to_vec(), TTL).await.unwrap();
        store.put(&key, b"second".to_vec(), TTL).await.unwrap();

        assert_eq!(value_of(&store, key.as_str()).await, Some(b"second".to_vec()));
        assert_eq!(store.keys_in_scope("user:u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        assert_eq!(store().get("emb:nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_missing() {
        let store = store();
        let key = CacheKey::analysis("u1", "j1");
        store.put(&key, vec![1], Duration::from_millis(30)).await.unwrap();

        let live = store.get(key.as_str()).await.unwrap().unwrap();
        assert!(live.remaining <= Duration::from_millis(30));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(store.get(key.as_str()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_prunes_expired_rows() {
        let store = store();
        let stale = CacheKey::analysis("u1", "j1");
        store.put(&stale, vec![1], Duration::from_millis(20)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        store
            .put(&CacheKey::embedding("fresh"), vec![2], TTL)
            .await
            .unwrap();

        assert!(store.keys_in_scope("user:u1").await.unwrap().is_empty());
        assert_eq!(store.prune_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scope_listing_and_bulk_delete() {
        let store = store();
        for job in ["j1", "j2", "j3"] {
            store
                .put(&CacheKey::analysis("alice", job), vec![1], TTL)
                .await
                .unwrap();
        }
        let bob = CacheKey::analysis("bob", "j1");
        store.put(&bob, vec![1], TTL).await.unwrap();
        store.put(&CacheKey::embedding("x"), vec![1], TTL).await.unwrap();

        let mut keys = store.keys_in_scope("user:alice").await.unwrap();
        keys.sort();
        assert_eq!(
            keys,
            vec!["analysis:5:alice:j1", "analysis:5:alice:j2", "analysis:5:alice:j3"]
        );

        assert_eq!(store.delete_scope("user:alice").await.unwrap(), 3);
        assert!(store.keys_in_scope("user:alice").await.unwrap().is_empty());
        assert!(value_of(&store, bob.as_str()).await.is_some());
        assert!(
            value_of(&store, CacheKey::embedding("x").as_str())
                .await
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let store = store();
        let key = CacheKey::analysis("u1", "j1");
        store.put(&key, vec![1], TTL).await.unwrap();

        assert!(store.delete(key.as_str()).await.unwrap());
        assert!(!store.delete(key.as_str()).await.unwrap());
    }
}

//! Tier 1: fast, TTL-bound key-value store.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache;
use tracing::debug;

use super::error::{CacheError, CacheResult};
use super::types::CacheKey;

/// Edge key-value store. Pattern deletion is optional.
pub trait Tier1Store: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = CacheResult<Option<Vec<u8>>>> + Send;

    /// Inserts or overwrites `key`; the TTL restarts on overwrite.
    fn put(
        &self,
        key: &CacheKey,
        value: Vec<u8>,
        ttl: Duration,
    ) -> impl Future<Output = CacheResult<()>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = CacheResult<()>> + Send;

    /// Deletes every entry written with `scope`. Returns `Ok(false)` when the store
    /// cannot do this, in which case callers fall back to per-key deletes.
    fn delete_scope(&self, _scope: &str) -> impl Future<Output = CacheResult<bool>> + Send {
        async { Ok(false) }
    }
}

#[derive(Debug, Clone)]
struct Tier1Entry {
    value: Arc<[u8]>,
    scope: Option<Arc<str>>,
    ttl: Duration,
}

struct EntryTtl;

impl Expiry<String, Tier1Entry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Tier1Entry, _now: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Tier1Entry,
        _now: Instant,
        _current: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process tier 1 backed by `moka` with a per-entry TTL.
#[derive(Clone)]
pub struct MokaTier1Store {
    entries: Cache<String, Tier1Entry>,
}

impl MokaTier1Store {
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .expire_after(EntryTtl)
                .support_invalidation_closures()
                .build(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

impl std::fmt::Debug for MokaTier1Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaTier1Store")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl Tier1Store for MokaTier1Store {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|e| e.value.to_vec()))
    }

    async fn put(&self, key: &CacheKey, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        self.entries.insert(
            key.as_str().to_string(),
            Tier1Entry {
                value: value.into(),
                scope: key.scope().map(Arc::from),
                ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.invalidate(key);
        Ok(())
    }

    async fn delete_scope(&self, scope: &str) -> CacheResult<bool> {
        let scope: Arc<str> = Arc::from(scope);
        let target = Arc::clone(&scope);
        self.entries
            .invalidate_entries_if(move |_, entry| entry.scope.as_deref() == Some(&*target))
            .map_err(|e| CacheError::Tier1 {
                reason: format!("scope invalidation rejected: {}", e),
            })?;
        debug!(scope = %scope, "Scheduled tier-1 scope invalidation");
        Ok(true)
    }
}

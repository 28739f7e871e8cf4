use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::error::{CacheError, CacheResult};
use super::tier1::Tier1Store;
use super::tier2::{Tier2Entry, Tier2Store};
use super::types::{CacheConfig, CacheKey};

fn is_live(expires_at: Option<Instant>) -> bool {
    expires_at.is_none_or(|at| at > Instant::now())
}

/// In-memory tier 1 without scope deletion. Entries expire lazily on read.
/// Failures can be injected.
#[derive(Debug, Default)]
pub struct InMemoryTier1Store {
    entries: Mutex<HashMap<String, (Vec<u8>, Option<Instant>)>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryTier1Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|(_, expires_at)| is_live(*expires_at))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Writes directly, bypassing failure injection. Seeded entries never expire.
    pub fn seed(&self, key: &str, value: Vec<u8>) {
        self.entries.lock().insert(key.to_string(), (value, None));
    }
}

impl Tier1Store for InMemoryTier1Store {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Tier1 {
                reason: "mock tier-1 read failure".to_string(),
            });
        }
        let mut entries = self.entries.lock();
        let live = entries
            .get(key)
            .filter(|(_, expires_at)| is_live(*expires_at))
            .map(|(value, _)| value.clone());
        if live.is_none() {
            entries.remove(key);
        }
        Ok(live)
    }

    async fn put(&self, key: &CacheKey, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Tier1 {
                reason: "mock tier-1 write failure".to_string(),
            });
        }
        self.entries
            .lock()
            .insert(key.as_str().to_string(), (value, Instant::now().checked_add(ttl)));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Tier1 {
                reason: "mock tier-1 delete failure".to_string(),
            });
        }
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredRow {
    scope: Option<String>,
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

/// In-memory tier 2 with scope support. Failures can be injected.
#[derive(Debug, Default)]
pub struct InMemoryTier2Store {
    rows: Mutex<HashMap<String, StoredRow>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryTier2Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rows
            .lock()
            .get(key)
            .is_some_and(|r| is_live(r.expires_at))
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }

    /// Writes directly with the namespace's default TTL, bypassing failure injection.
    pub fn seed(&self, key: &CacheKey, value: Vec<u8>) {
        let ttl = CacheConfig::default().ttl_for(key.namespace());
        self.insert(key, value, ttl);
    }

    fn insert(&self, key: &CacheKey, value: Vec<u8>, ttl: Duration) {
        self.rows.lock().insert(
            key.as_str().to_string(),
            StoredRow {
                scope: key.scope().map(str::to_string),
                value,
                expires_at: Instant::now().checked_add(ttl),
            },
        );
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> CacheResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(CacheError::Tier2 {
                reason: format!("mock tier-2 {} failure", op),
            });
        }
        Ok(())
    }
}

impl Tier2Store for InMemoryTier2Store {
    async fn get(&self, key: &str) -> CacheResult<Option<Tier2Entry>> {
        self.check(&self.fail_reads, "read")?;
        Ok(self
            .rows
            .lock()
            .get(key)
            .filter(|r| is_live(r.expires_at))
            .map(|r| Tier2Entry {
                value: r.value.clone(),
                remaining: r
                    .expires_at
                    .map_or(Duration::MAX, |at| at.saturating_duration_since(Instant::now())),
            }))
    }

    async fn put(&self, key: &CacheKey, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        self.check(&self.fail_writes, "write")?;
        self.rows.lock().retain(|_, r| is_live(r.expires_at));
        self.insert(key, value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        self.check(&self.fail_writes, "delete")?;
        Ok(self.rows.lock().remove(key).is_some())
    }

    async fn keys_in_scope(&self, scope: &str) -> CacheResult<Vec<String>> {
        self.check(&self.fail_reads, "scope read")?;
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|(_, r)| r.scope.as_deref() == Some(scope))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn delete_scope(&self, scope: &str) -> CacheResult<u64> {
        self.check(&self.fail_writes, "scope delete")?;
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|_, r| r.scope.as_deref() != Some(scope));
        Ok((before - rows.len()) as u64)
    }
}

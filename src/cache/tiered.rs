//! Tiered cache: tier 1 (fast, TTL) over tier 2 (durable).

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::storage::Database;

#[cfg(any(test, feature = "mock"))]
use super::mock::{InMemoryTier1Store, InMemoryTier2Store};
use super::error::CacheResult;
use super::tier1::{MokaTier1Store, Tier1Store};
use super::tier2::{SqliteTier2Store, Tier2Store};
use super::types::{CacheConfig, CacheKey, CacheLookup, InvalidationReport, WriteOutcome};

/// Read-through/write-through facade over the two cache tiers.
///
/// The cache never produces values itself. A tier-2 hit is copied back into tier 1 by a
/// detached task, so a concurrent reader may still miss tier 1 for a short while.
pub struct TieredCache<T1, T2> {
    tier1: Arc<T1>,
    tier2: Arc<T2>,
    config: CacheConfig,
}

impl<T1, T2> Clone for TieredCache<T1, T2> {
    fn clone(&self) -> Self {
        Self {
            tier1: Arc::clone(&self.tier1),
            tier2: Arc::clone(&self.tier2),
            config: self.config.clone(),
        }
    }
}

impl<T1, T2> std::fmt::Debug for TieredCache<T1, T2> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T1: Tier1Store, T2: Tier2Store> TieredCache<T1, T2> {
    pub fn new(tier1: Arc<T1>, tier2: Arc<T2>, config: CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        Ok(Self {
            tier1,
            tier2,
            config,
        })
    }

    pub fn tier1(&self) -> &T1 {
        &self.tier1
    }

    pub fn tier2(&self) -> &T2 {
        &self.tier2
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Tier 1, then tier 2 (backfilling tier 1 on a hit), then [`CacheLookup::Miss`].
    ///
    /// Store failures are logged and treated as misses. Backfilled entries keep the
    /// tier-2 expiry, so an entry never outlives the TTL it was written with.
    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn get(&self, key: &CacheKey) -> CacheLookup<Vec<u8>> {
        match self.tier1.get(key.as_str()).await {
            Ok(Some(value)) => {
                debug!("Tier-1 hit");
                return CacheLookup::HitTier1(value);
            }
            Ok(None) => debug!("Tier-1 miss, checking tier 2"),
            Err(e) => warn!(error = %e, "Tier-1 read failed, checking tier 2"),
        }

        match self.tier2.get(key.as_str()).await {
            Ok(Some(entry)) => {
                info!(bytes = entry.value.len(), "Tier-2 hit, backfilling tier 1");
                self.spawn_backfill(key.clone(), entry.value.clone(), entry.remaining);
                CacheLookup::HitTier2(entry.value)
            }
            Ok(None) => {
                debug!("Cache miss");
                CacheLookup::Miss
            }
            Err(e) => {
                warn!(error = %e, "Tier-2 read failed, treating as miss");
                CacheLookup::Miss
            }
        }
    }

    fn spawn_backfill(&self, key: CacheKey, value: Vec<u8>, remaining: Duration) {
        let tier1 = Arc::clone(&self.tier1);
        let ttl = remaining.min(self.config.ttl_for(key.namespace()));
        tokio::spawn(async move {
            if let Err(e) = tier1.put(&key, value, ttl).await {
                warn!(key = %key, error = %e, "Tier-1 backfill failed");
            }
        });
    }

    /// Writes both tiers concurrently. Never fails; see [`WriteOutcome`].
    #[instrument(skip(self, key, value), fields(key = %key, bytes = value.len()))]
    pub async fn put(&self, key: &CacheKey, value: Vec<u8>) -> WriteOutcome {
        let ttl = self.config.ttl_for(key.namespace());
        let (t1, t2) = tokio::join!(
            self.tier1.put(key, value.clone(), ttl),
            self.tier2.put(key, value, ttl)
        );

        let tier1 = match t1 {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Tier-1 write failed");
                false
            }
        };
        let tier2 = match t2 {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Tier-2 write failed, value is not durable");
                false
            }
        };

        if tier1 && tier2 {
            debug!("Cached in both tiers");
        }
        WriteOutcome { tier1, tier2 }
    }

    /// Deletes `keys` from both tiers, or everything in `scope` when `keys` is `None`.
    ///
    /// Tier-1 deletion is best-effort. Tier 2 is authoritative, so its errors are returned.
    #[instrument(skip(self, keys), fields(scope = scope, explicit = keys.is_some()))]
    pub async fn invalidate(
        &self,
        scope: &str,
        keys: Option<&[CacheKey]>,
    ) -> CacheResult<InvalidationReport> {
        let mut report = InvalidationReport::default();

        match keys {
            Some(keys) => {
                for key in keys {
                    self.delete_tier1(key.as_str(), &mut report).await;
                    if self.tier2.delete(key.as_str()).await? {
                        report.tier2_deleted += 1;
                    }
                }
            }
            None => {
                for key in self.tier2.keys_in_scope(scope).await? {
                    self.delete_tier1(&key, &mut report).await;
                }
                report.tier1_scope_cleared = match self.tier1.delete_scope(scope).await {
                    Ok(cleared) => cleared,
                    Err(e) => {
                        warn!(error = %e, "Tier-1 scope delete failed");
                        false
                    }
                };
                report.tier2_deleted = self.tier2.delete_scope(scope).await?;
            }
        }

        info!(
            tier1_deleted = report.tier1_deleted,
            tier1_failed = report.tier1_failed,
            tier2_deleted = report.tier2_deleted,
            "Cache invalidated"
        );
        Ok(report)
    }

    async fn delete_tier1(&self, key: &str, report: &mut InvalidationReport) {
        match self.tier1.delete(key).await {
            Ok(()) => report.tier1_deleted += 1,
            Err(e) => {
                warn!(key, error = %e, "Tier-1 delete failed, entry will expire with its TTL");
                report.tier1_failed += 1;
            }
        }
    }
}

/// Production cache: moka in front of SQLite.
pub type SqliteTieredCache = TieredCache<MokaTier1Store, SqliteTier2Store>;

impl TieredCache<MokaTier1Store, SqliteTier2Store> {
    pub fn open(db: Database, config: CacheConfig) -> CacheResult<Self> {
        let tier1 = MokaTier1Store::new(config.tier1_capacity);
        Self::new(Arc::new(tier1), Arc::new(SqliteTier2Store::new(db)), config)
    }
}

#[cfg(any(test, feature = "mock"))]
pub type MockTieredCache = TieredCache<InMemoryTier1Store, InMemoryTier2Store>;

#[cfg(any(test, feature = "mock"))]
impl TieredCache<InMemoryTier1Store, InMemoryTier2Store> {
    pub fn new_mock() -> Self {
        Self {
            tier1: Arc::new(InMemoryTier1Store::new()),
            tier2: Arc::new(InMemoryTier2Store::new()),
            config: CacheConfig::default(),
        }
    }
}

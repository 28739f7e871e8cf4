use std::time::Duration;

use crate::config::Config;
use crate::constants::{ANALYSIS_TTL, DEFAULT_TIER1_CAPACITY, EMBEDDING_TTL};
use crate::hashing::content_address;

use super::error::{CacheError, CacheResult};

/// Kind of value stored under a key; decides the tier-1 TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    Embedding,
    Analysis,
}

impl CacheNamespace {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheNamespace::Embedding => "emb",
            CacheNamespace::Analysis => "analysis",
        }
    }
}

impl std::fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-qualified cache key plus the invalidation scope it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    key: String,
    scope: Option<String>,
    namespace: CacheNamespace,
}

impl CacheKey {
    /// Content-addressed key for the embedding of `text`: `emb:<blake3(canonical text)>`.
    pub fn embedding(text: &str) -> Self {
        Self {
            key: format!("{}:{}", CacheNamespace::Embedding, content_address(text)),
            scope: None,
            namespace: CacheNamespace::Embedding,
        }
    }

    /// `analysis:<user len>:<user>:<job>`, scoped to the user so profile changes can drop
    /// them all. The length prefix keeps ids containing `:` from colliding.
    pub fn analysis(user_id: &str, job_id: &str) -> Self {
        Self {
            key: format!(
                "{}:{}:{}:{}",
                CacheNamespace::Analysis,
                user_id.len(),
                user_id,
                job_id
            ),
            scope: Some(user_scope(user_id)),
            namespace: CacheNamespace::Analysis,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    #[inline]
    pub fn namespace(&self) -> CacheNamespace {
        self.namespace
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key)
    }
}

/// Invalidation scope holding every cached analysis for `user_id`.
pub fn user_scope(user_id: &str) -> String {
    format!("user:{}", user_id)
}

/// Outcome of a tiered lookup. `Miss` is a control-flow signal, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<V> {
    HitTier1(V),
    HitTier2(V),
    Miss,
}

impl<V> CacheLookup<V> {
    pub fn is_hit(&self) -> bool {
        !matches!(self, CacheLookup::Miss)
    }

    pub fn is_tier1_hit(&self) -> bool {
        matches!(self, CacheLookup::HitTier1(_))
    }

    pub fn is_tier2_hit(&self) -> bool {
        matches!(self, CacheLookup::HitTier2(_))
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            CacheLookup::HitTier1(v) | CacheLookup::HitTier2(v) => Some(v),
            CacheLookup::Miss => None,
        }
    }

    /// Maps the hit value, turning it into a miss when `f` returns `None`.
    pub fn and_then<U>(self, f: impl FnOnce(V) -> Option<U>) -> CacheLookup<U> {
        match self {
            CacheLookup::HitTier1(v) => f(v).map_or(CacheLookup::Miss, CacheLookup::HitTier1),
            CacheLookup::HitTier2(v) => f(v).map_or(CacheLookup::Miss, CacheLookup::HitTier2),
            CacheLookup::Miss => CacheLookup::Miss,
        }
    }
}

/// Which tiers accepted a write. The value is usable either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOutcome {
    pub tier1: bool,
    pub tier2: bool,
}

impl WriteOutcome {
    /// Tier 2 is authoritative; a write it rejected will not survive a restart.
    pub fn is_durable(&self) -> bool {
        self.tier2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvalidationReport {
    /// Keys deleted from tier 1 one at a time.
    pub tier1_deleted: usize,
    /// Tier-1 deletes that failed. Those entries expire with their TTL.
    pub tier1_failed: usize,
    /// Whether tier 1 also cleared the whole scope natively.
    pub tier1_scope_cleared: bool,
    pub tier2_deleted: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub tier1_capacity: u64,
    pub embedding_ttl: Duration,
    pub analysis_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            tier1_capacity: DEFAULT_TIER1_CAPACITY,
            embedding_ttl: EMBEDDING_TTL,
            analysis_ttl: ANALYSIS_TTL,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> CacheResult<()> {
        if self.tier1_capacity == 0 {
            return Err(CacheError::ConfigError {
                reason: "tier1_capacity must be greater than zero".to_string(),
            });
        }
        if self.embedding_ttl.is_zero() || self.analysis_ttl.is_zero() {
            return Err(CacheError::ConfigError {
                reason: "cache TTLs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn ttl_for(&self, namespace: CacheNamespace) -> Duration {
        match namespace {
            CacheNamespace::Embedding => self.embedding_ttl,
            CacheNamespace::Analysis => self.analysis_ttl,
        }
    }
}

impl From<&Config> for CacheConfig {
    fn from(config: &Config) -> Self {
        Self {
            tier1_capacity: config.tier1_capacity,
            embedding_ttl: config.embedding_ttl,
            analysis_ttl: config.analysis_ttl,
        }
    }
}

//! Two-tier cache for embeddings and compatibility analyses.
//!
//! Tier 1 is a fast TTL store ([`MokaTier1Store`]); tier 2 is the durable SQLite table
//! ([`SqliteTier2Store`]). [`TieredCache`] chains them and owns their lifecycle.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod tier1;
pub mod tier2;
pub mod tiered;
mod typed;
pub mod types;


pub use error::{CacheError, CacheResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{InMemoryTier1Store, InMemoryTier2Store};
pub use tier1::{MokaTier1Store, Tier1Store};
pub use tier2::{SqliteTier2Store, Tier2Entry, Tier2Store};
#[cfg(any(test, feature = "mock"))]
pub use tiered::MockTieredCache;
pub use tiered::{SqliteTieredCache, TieredCache};
pub use types::{
    CacheConfig, CacheKey, CacheLookup, CacheNamespace, InvalidationReport, WriteOutcome,
    user_scope,
};

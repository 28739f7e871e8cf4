use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
/// Errors returned by the cache tiers.
///
/// The [`TieredCache`](super::TieredCache) facade never returns these from `get` or `put`;
/// read failures degrade to a miss and write failures are logged.
pub enum CacheError {
    /// Tier-1 store failed.
    #[error("tier-1 store error: {reason}")]
    Tier1 {
        /// Error message.
        reason: String,
    },

    /// Tier-2 store failed outside of SQLite (mock or remote backends).
    #[error("tier-2 store error: {reason}")]
    Tier2 {
        /// Error message.
        reason: String,
    },

    /// Tier-2 SQLite error.
    #[error("tier-2 storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to encode cache value: {reason}")]
    Encode { reason: String },

    /// Invalid configuration.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

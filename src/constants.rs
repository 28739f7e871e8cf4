//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary constants (e.g. byte sizes) from primary ones to avoid drift.
//!
//! # Dimension Invariants
//!
//! The embedding dimension is a compile-time invariant shared by the generator, the cache
//! codec and the vector index. Use [`validate_embedding_dim`] at module boundaries to catch
//! mismatches early instead of letting them reach the similarity math.

use std::time::Duration;

/// Length of every embedding vector produced or stored by this crate.
pub const EMBEDDING_DIM: usize = 768;
pub const EMBEDDING_F32_BYTES: usize = EMBEDDING_DIM * 4;
pub const EMBEDDING_DIM_U64: u64 = EMBEDDING_DIM as u64;

/// Default character ceiling applied to text before it reaches the embedding model.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 8_000;

pub const DEFAULT_EMBED_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_EMBED_RETRY_BASE: Duration = Duration::from_millis(500);

/// Tier-1 lifetime of raw embeddings (30 days).
pub const EMBEDDING_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);
/// Tier-1 lifetime of compatibility analyses (7 days).
pub const ANALYSIS_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub const DEFAULT_TIER1_CAPACITY: u64 = 10_000;

/// Weight of the semantic signal in blended scores.
pub const SEMANTIC_WEIGHT: f64 = 0.7;
/// Weight of the keyword signal in blended scores.
pub const KEYWORD_WEIGHT: f64 = 0.3;

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use jobmatch::constants::{validate_embedding_dim, EMBEDDING_DIM};
///
/// assert!(validate_embedding_dim(768, EMBEDDING_DIM).is_ok());
/// assert!(validate_embedding_dim(767, EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

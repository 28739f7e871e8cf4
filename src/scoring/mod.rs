//! Vector math: cosine similarity, similarity ranking and hybrid score blending.
//!
//! Everything here is pure and deterministic. Invalid vectors fail fast with a typed
//! [`ScoringError`]; nothing is silently coerced, because a truncated or padded vector
//! would corrupt every downstream score.

pub mod error;
pub mod hybrid;
pub mod similarity;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{ScoringError, ScoringResult};
pub use hybrid::{hybrid_score, hybrid_score_weighted};
pub use similarity::{cosine_similarity, rank_by_similarity, to_unit_interval, validate_vector};
pub use types::{HybridWeights, RankedResult, SimilarityCandidate};

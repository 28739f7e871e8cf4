//! Cosine similarity and similarity ranking.

use tracing::debug;

use super::error::{ScoringError, ScoringResult};
use super::types::{RankedResult, SimilarityCandidate};

/// Cosine similarity of two equal-length, finite, non-zero vectors.
///
/// Accumulates in `f64` in a single pass so that huge or subnormal `f32` components
/// neither overflow nor flush to zero. The result is clamped to `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> ScoringResult<f64> {
    if a.is_empty() || b.is_empty() {
        return Err(ScoringError::InvalidVector {
            reason: "vector is empty".to_string(),
        });
    }
    if a.len() != b.len() {
        return Err(ScoringError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a_sq = 0.0f64;
    let mut norm_b_sq = 0.0f64;

    for (i, (&av, &bv)) in a.iter().zip(b.iter()).enumerate() {
        if !av.is_finite() || !bv.is_finite() {
            return Err(ScoringError::InvalidVector {
                reason: format!("non-finite element at index {}", i),
            });
        }
        let av = f64::from(av);
        let bv = f64::from(bv);
        dot += av * bv;
        norm_a_sq += av * av;
        norm_b_sq += bv * bv;
    }

    if norm_a_sq == 0.0 || norm_b_sq == 0.0 {
        return Err(ScoringError::ZeroVector);
    }

    Ok((dot / (norm_a_sq * norm_b_sq).sqrt()).clamp(-1.0, 1.0))
}

/// Checks that a vector could take part in a similarity computation.
pub fn validate_vector(v: &[f32]) -> ScoringResult<()> {
    if v.is_empty() {
        return Err(ScoringError::InvalidVector {
            reason: "vector is empty".to_string(),
        });
    }
    if let Some(i) = v.iter().position(|x| !x.is_finite()) {
        return Err(ScoringError::InvalidVector {
            reason: format!("non-finite element at index {}", i),
        });
    }
    if v.iter().all(|&x| x == 0.0) {
        return Err(ScoringError::ZeroVector);
    }
    Ok(())
}

/// Maps a cosine similarity from `[-1, 1]` to `[0, 1]`.
#[inline]
pub fn to_unit_interval(similarity: f64) -> f64 {
    ((similarity + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Ranks candidates by cosine similarity to `query`, highest first.
///
/// The sort is stable: candidates with equal scores keep their input order
/// ("first seen wins"). A candidate with an invalid embedding aborts the ranking
/// with [`ScoringError::Candidate`] naming that candidate.
pub fn rank_by_similarity<T>(
    query: &[f32],
    candidates: Vec<SimilarityCandidate<T>>,
) -> ScoringResult<Vec<RankedResult<T>>> {
    if query.is_empty() {
        return Err(ScoringError::InvalidInput {
            reason: "query vector is empty".to_string(),
        });
    }
    validate_vector(query)?;

    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let mut ranked = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let semantic_score =
            cosine_similarity(query, &candidate.embedding).map_err(|e| {
                ScoringError::Candidate {
                    id: candidate.id.clone(),
                    source: Box::new(e),
                }
            })?;

        ranked.push(RankedResult {
            id: candidate.id,
            item: candidate.item,
            semantic_score,
            normalized_score: to_unit_interval(semantic_score) * 100.0,
            keyword_score: None,
            combined_score: None,
        });
    }

    ranked.sort_by(|a, b| b.semantic_score.total_cmp(&a.semantic_score));

    debug!(
        candidates = ranked.len(),
        best_score = ranked.first().map(|r| r.semantic_score),
        "Ranked candidates by similarity"
    );

    Ok(ranked)
}

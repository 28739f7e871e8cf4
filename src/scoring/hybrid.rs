//! Fixed and weighted semantic/keyword score blending.

use super::error::{ScoringError, ScoringResult};
use super::types::HybridWeights;

/// Blends a semantic score in `[0, 1]` with a keyword score in `[0, 100]`.
///
/// `semantic * 100 * 0.7 + keyword * 0.3`, rounded to two decimals. The weighting is
/// fixed; use [`hybrid_score_weighted`] for anything else.
pub fn hybrid_score(semantic: f64, keyword: f64) -> ScoringResult<f64> {
    hybrid_score_weighted(semantic, keyword, HybridWeights::default())
}

/// [`hybrid_score`] with caller-supplied weights.
pub fn hybrid_score_weighted(
    semantic: f64,
    keyword: f64,
    weights: HybridWeights,
) -> ScoringResult<f64> {
    check_range("semantic score", semantic, 0.0, 1.0)?;
    check_range("keyword score", keyword, 0.0, 100.0)?;
    weights.validate()?;

    let blended = semantic * 100.0 * weights.semantic + keyword * weights.keyword;
    Ok(round2(blended).clamp(0.0, 100.0))
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> ScoringResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(ScoringError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[inline]
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

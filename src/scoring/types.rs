use serde::{Deserialize, Serialize};

use crate::constants::{KEYWORD_WEIGHT, SEMANTIC_WEIGHT};

use super::error::{ScoringError, ScoringResult};
use super::hybrid::hybrid_score;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Relative weight of the semantic and keyword signals in a blended score.
pub struct HybridWeights {
    pub semantic: f64,
    pub keyword: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            semantic: SEMANTIC_WEIGHT,
            keyword: KEYWORD_WEIGHT,
        }
    }
}

impl HybridWeights {
    pub fn new(semantic: f64, keyword: f64) -> ScoringResult<Self> {
        let weights = Self { semantic, keyword };
        weights.validate()?;
        Ok(weights)
    }

    /// Weights must be finite, non-negative and sum to 1.
    pub fn validate(&self) -> ScoringResult<()> {
        for (name, value) in [
            ("semantic weight", self.semantic),
            ("keyword weight", self.keyword),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ScoringError::OutOfRange {
                    name,
                    value,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }

        let sum = self.semantic + self.keyword;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringError::InvalidInput {
                reason: format!("weights must sum to 1.0, got {}", sum),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// An item to rank together with its stored embedding.
pub struct SimilarityCandidate<T> {
    pub id: String,
    pub item: T,
    pub embedding: Vec<f32>,
}

impl<T> SimilarityCandidate<T> {
    pub fn new(id: impl Into<String>, item: T, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            item,
            embedding,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Query-scoped ranking output. Never persisted.
pub struct RankedResult<T> {
    pub id: String,
    pub item: T,
    /// Raw cosine similarity in `[-1, 1]`.
    pub semantic_score: f64,
    /// Similarity mapped to `[0, 100]`.
    pub normalized_score: f64,
    /// Keyword relevance in `[0, 100]`, when a keyword signal was blended in.
    pub keyword_score: Option<f64>,
    /// Output of [`hybrid_score`], when a keyword signal was blended in.
    pub combined_score: Option<f64>,
}

impl<T> RankedResult<T> {
    /// Semantic similarity mapped to `[0, 1]`.
    pub fn semantic_unit(&self) -> f64 {
        super::similarity::to_unit_interval(self.semantic_score)
    }

    /// Blends a keyword score (`[0, 100]`) into this result using the fixed 70/30 weighting.
    pub fn with_keyword_score(mut self, keyword_score: f64) -> ScoringResult<Self> {
        let combined = hybrid_score(self.semantic_unit(), keyword_score)?;
        self.keyword_score = Some(keyword_score);
        self.combined_score = Some(combined);
        Ok(self)
    }

    /// Returns the score callers should sort or display by.
    pub fn display_score(&self) -> f64 {
        self.combined_score.unwrap_or(self.normalized_score)
    }
}

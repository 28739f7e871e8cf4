//! Typed access for the two kinds of cached values.
//!
//! Embeddings are stored as little-endian `f32` bytes under a content-addressed key.
//! Analyses are stored as JSON under a `(user, job)` key scoped to the user.

use tracing::{error, warn};

use crate::embedding::EmbeddingVector;
use crate::model::CompatibilityAnalysis;

use super::error::CacheResult;
use super::tier1::Tier1Store;
use super::tier2::Tier2Store;
use super::tiered::TieredCache;
use super::types::{CacheKey, CacheLookup, InvalidationReport, WriteOutcome, user_scope};

impl<T1: Tier1Store, T2: Tier2Store> TieredCache<T1, T2> {
    pub async fn get_embedding(&self, text: &str) -> CacheLookup<EmbeddingVector> {
        let key = CacheKey::embedding(text);
        self.get(&key)
            .await
            .and_then(|bytes| match EmbeddingVector::from_le_bytes(&bytes) {
                Ok(v) => Some(v),
                Err(e) => {
                    error!(key = %key, error = %e, "Cached embedding is corrupt, treating as miss");
                    None
                }
            })
    }

    pub async fn put_embedding(&self, text: &str, vector: &EmbeddingVector) -> WriteOutcome {
        self.put(&CacheKey::embedding(text), vector.to_le_bytes())
            .await
    }

    pub async fn get_analysis(
        &self,
        user_id: &str,
        job_id: &str,
    ) -> CacheLookup<CompatibilityAnalysis> {
        let key = CacheKey::analysis(user_id, job_id);
        self.get(&key)
            .await
            .and_then(|bytes| match serde_json::from_slice::<CompatibilityAnalysis>(&bytes) {
                Ok(analysis) if analysis.user_id == user_id && analysis.job_id == job_id => {
                    Some(analysis)
                }
                Ok(analysis) => {
                    error!(
                        key = %key,
                        cached_user = %analysis.user_id,
                        cached_job = %analysis.job_id,
                        "Cached analysis belongs to another pair, treating as miss"
                    );
                    None
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Cached analysis failed to decode, treating as miss");
                    None
                }
            })
    }

    /// Stores (overwriting) the analysis for its `(user, job)` pair.
    pub async fn put_analysis(&self, analysis: &CompatibilityAnalysis) -> WriteOutcome {
        let key = CacheKey::analysis(&analysis.user_id, &analysis.job_id);
        match serde_json::to_vec(analysis) {
            Ok(bytes) => self.put(&key, bytes).await,
            Err(e) => {
                error!(key = %key, error = %e, "Failed to encode analysis");
                WriteOutcome::default()
            }
        }
    }

    /// Drops the user's cached analyses: the listed jobs, or all of them when `None`.
    pub async fn invalidate_analyses(
        &self,
        user_id: &str,
        job_ids: Option<&[&str]>,
    ) -> CacheResult<InvalidationReport> {
        let scope = user_scope(user_id);
        match job_ids {
            Some(job_ids) => {
                let keys: Vec<CacheKey> = job_ids
                    .iter()
                    .map(|job_id| CacheKey::analysis(user_id, job_id))
                    .collect();
                self.invalidate(&scope, Some(&keys)).await
            }
            None => self.invalidate(&scope, None).await,
        }
    }
}

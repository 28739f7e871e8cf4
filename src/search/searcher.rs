use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::embedding::{EmbeddingGenerator, EmbeddingProvider, EmbeddingResult, EmbeddingVector};
use crate::scoring::HybridWeights;
use crate::vectordb::{VectorIndex, VectorMatch};

use super::error::{SearchError, SearchResult};
use super::keyword::KeywordIndex;
use super::merge::merge_results;
use super::types::{DegradedSource, HybridSearchResponse, KeywordHit};

/// Turns query text into a vector for the semantic branch.
pub trait QueryEmbedder: Send + Sync + 'static {
    fn embed_query(&self, text: &str)
    -> impl Future<Output = EmbeddingResult<EmbeddingVector>> + Send;
}

impl<P: EmbeddingProvider> QueryEmbedder for EmbeddingGenerator<P> {
    async fn embed_query(&self, text: &str) -> EmbeddingResult<EmbeddingVector> {
        self.generate(text).await
    }
}

/// Runs the keyword and semantic queries concurrently and merges them.
pub struct HybridSearcher<K, V, E> {
    keyword: Arc<K>,
    vectors: Arc<V>,
    embedder: Arc<E>,
}

impl<K, V, E> Clone for HybridSearcher<K, V, E> {
    fn clone(&self) -> Self {
        Self {
            keyword: Arc::clone(&self.keyword),
            vectors: Arc::clone(&self.vectors),
            embedder: Arc::clone(&self.embedder),
        }
    }
}

impl<K, V, E> std::fmt::Debug for HybridSearcher<K, V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridSearcher").finish_non_exhaustive()
    }
}

impl<K: KeywordIndex, V: VectorIndex, E: QueryEmbedder> HybridSearcher<K, V, E> {
    pub fn new(keyword: Arc<K>, vectors: Arc<V>, embedder: Arc<E>) -> Self {
        Self {
            keyword,
            vectors,
            embedder,
        }
    }

    pub fn keyword_index(&self) -> &K {
        &self.keyword
    }

    pub fn vector_index(&self) -> &V {
        &self.vectors
    }

    /// Top `top_k` jobs owned by `user_id` for `query`.
    ///
    /// Each branch fetches `2 * top_k` candidates so that jobs found by only one source
    /// still compete. If one branch fails the other's results are returned with
    /// `degraded` set; only a failure of both is an error.
    #[instrument(skip(self, query, weights), fields(query_len = query.len()))]
    pub async fn search(
        &self,
        query: &str,
        user_id: &str,
        top_k: usize,
        weights: HybridWeights,
    ) -> SearchResult<HybridSearchResponse> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidInput {
                reason: "query is empty".to_string(),
            });
        }
        if user_id.trim().is_empty() {
            return Err(SearchError::InvalidInput {
                reason: "user id is empty".to_string(),
            });
        }
        if top_k == 0 {
            return Err(SearchError::InvalidInput {
                reason: "top_k must be at least 1".to_string(),
            });
        }
        weights.validate()?;

        let pool = top_k.saturating_mul(2);
        let (keyword, semantic) = tokio::join!(
            self.keyword.search(query, user_id, pool),
            self.semantic_branch(query, user_id, pool)
        );

        let (keyword_hits, semantic_hits, degraded) = match (keyword, semantic) {
            (Ok(k), Ok(s)) => (k, s, None),
            (Ok(k), Err(e)) => {
                warn!(error = %e, "Semantic search failed, returning keyword results only");
                (k, Vec::new(), Some(DegradedSource::Semantic))
            }
            (Err(e), Ok(s)) => {
                warn!(error = %e, "Keyword search failed, returning semantic results only");
                (Vec::<KeywordHit>::new(), s, Some(DegradedSource::Keyword))
            }
            (Err(k), Err(s)) => {
                return Err(SearchError::Unavailable {
                    keyword: k.to_string(),
                    semantic: s.to_string(),
                });
            }
        };

        let hits = merge_results(&keyword_hits, &semantic_hits, weights, top_k);
        info!(
            keyword_hits = keyword_hits.len(),
            semantic_hits = semantic_hits.len(),
            returned = hits.len(),
            degraded = degraded.is_some(),
            "Hybrid search complete"
        );

        Ok(HybridSearchResponse { hits, degraded })
    }

    async fn semantic_branch(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> SearchResult<Vec<VectorMatch>> {
        let vector = self
            .embedder
            .embed_query(query)
            .await
            .map_err(|e| SearchError::Semantic {
                reason: e.to_string(),
            })?;

        let matches = self
            .vectors
            .search(vector.into_inner(), limit as u64, Some(user_id))
            .await
            .map_err(|e| SearchError::Semantic {
                reason: e.to_string(),
            })?;

        Ok(filter_tenant(matches, user_id))
    }
}

/// Drops matches owned by anyone but `user_id`. The index filter is not trusted.
pub fn filter_tenant(matches: Vec<VectorMatch>, user_id: &str) -> Vec<VectorMatch> {
    let before = matches.len();
    let kept: Vec<VectorMatch> = matches
        .into_iter()
        .filter(|m| m.user_id == user_id)
        .collect();

    let dropped = before - kept.len();
    if dropped > 0 {
        warn!(user_id, dropped, "Vector index returned other tenants' jobs");
    } else {
        debug!(kept = kept.len(), "Tenant filter passed");
    }
    kept
}

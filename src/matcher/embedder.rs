use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::cache::{Tier1Store, Tier2Store, TieredCache};
use crate::embedding::{EmbeddingGenerator, EmbeddingProvider, EmbeddingResult, EmbeddingVector};
use crate::hashing::canonicalize_text;
use crate::search::QueryEmbedder;

/// Cache-or-generate embedding lookup.
///
/// Text is canonicalized before both the cache lookup and the model call, so cosmetic
/// whitespace changes hit the same entry and never cost a second model call.
pub struct CachedEmbedder<P, T1, T2> {
    generator: Arc<EmbeddingGenerator<P>>,
    cache: TieredCache<T1, T2>,
}

impl<P, T1, T2> Clone for CachedEmbedder<P, T1, T2> {
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
            cache: self.cache.clone(),
        }
    }
}

impl<P, T1, T2> std::fmt::Debug for CachedEmbedder<P, T1, T2> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedEmbedder").finish_non_exhaustive()
    }
}

impl<P, T1, T2> CachedEmbedder<P, T1, T2>
where
    P: EmbeddingProvider,
    T1: Tier1Store,
    T2: Tier2Store,
{
    pub fn new(generator: Arc<EmbeddingGenerator<P>>, cache: TieredCache<T1, T2>) -> Self {
        Self { generator, cache }
    }

    pub fn generator(&self) -> &EmbeddingGenerator<P> {
        &self.generator
    }

    pub fn cache(&self) -> &TieredCache<T1, T2> {
        &self.cache
    }

    pub async fn embed(&self, text: &str) -> EmbeddingResult<EmbeddingVector> {
        self.embed_cancellable(text, &CancellationToken::new()).await
    }

    #[instrument(skip(self, text, cancel), fields(text_len = text.len()))]
    pub async fn embed_cancellable(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> EmbeddingResult<EmbeddingVector> {
        let canonical = canonicalize_text(text);

        if let Some(vector) = self.cache.get_embedding(&canonical).await.into_value() {
            debug!("Embedding served from cache");
            return Ok(vector);
        }

        let vector = self
            .generator
            .generate_cancellable(&canonical, cancel)
            .await?;

        if !self.cache.put_embedding(&canonical, &vector).await.is_durable() {
            warn!("Embedding generated but not durably cached");
        }
        Ok(vector)
    }
}

impl<P, T1, T2> QueryEmbedder for CachedEmbedder<P, T1, T2>
where
    P: EmbeddingProvider,
    T1: Tier1Store,
    T2: Tier2Store,
{
    async fn embed_query(&self, text: &str) -> EmbeddingResult<EmbeddingVector> {
        self.embed(text).await
    }
}

use std::sync::Arc;

use futures_util::future::try_join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::cache::{
    InvalidationReport, MokaTier1Store, SqliteTier2Store, Tier1Store, Tier2Store, TieredCache,
};
use crate::dedup::{CanonicalStore, DedupEngine, IngestOutcome, SqliteCanonicalStore};
use crate::embedding::{
    EmbeddingGenerator, EmbeddingProvider, EmbeddingVector, HttpEmbeddingProvider,
    build_job_text, build_profile_text,
};
use crate::model::{CandidateProfile, CompatibilityAnalysis, JobRecord, ProfileChange};
use crate::scoring::{HybridWeights, RankedResult, SimilarityCandidate, rank_by_similarity};
use crate::search::{HybridSearchResponse, HybridSearcher, KeywordIndex, SqliteKeywordIndex};
use crate::storage::now_millis;
use crate::vectordb::{JobVectorPoint, QdrantVectorIndex, VectorIndex, WriteConsistency};

use super::analyzer::CompatibilityAnalyzer;
use super::embedder::CachedEmbedder;
use super::error::{MatchError, MatchResult};

/// What happened to one ingested job record.
#[derive(Debug)]
pub struct IngestReport {
    /// The record as ingested, with `canonical_id` set when it is a duplicate.
    pub job: JobRecord,
    pub outcome: IngestOutcome,
    /// `false` when the keyword upsert failed. The job is still deduplicated.
    pub keyword_indexed: bool,
    /// Background embed-and-index task, present for new canonical jobs and repeat
    /// ingests of a canonical job.
    ///
    /// Dropping the handle detaches the task; it keeps running.
    pub embedding_task: Option<JoinHandle<MatchResult<()>>>,
}

impl IngestReport {
    /// Waits for the background embedding task, if one was started.
    pub async fn wait_indexed(self) -> MatchResult<()> {
        match self.embedding_task {
            Some(task) => task.await.map_err(|e| MatchError::Task {
                reason: e.to_string(),
            })?,
            None => Ok(()),
        }
    }
}

/// Ties deduplication, embedding, caching, indexing and search together.
///
/// Type parameters are the embedding provider (`P`), the two cache tiers (`T1`, `T2`),
/// the canonical job store (`S`), the keyword index (`K`) and the vector index (`V`).
pub struct MatchEngine<P, T1, T2, S, K, V> {
    embedder: CachedEmbedder<P, T1, T2>,
    dedup: DedupEngine<S>,
    keyword: Arc<K>,
    vectors: Arc<V>,
    searcher: HybridSearcher<K, V, CachedEmbedder<P, T1, T2>>,
}

impl<P, T1, T2, S, K, V> Clone for MatchEngine<P, T1, T2, S, K, V> {
    fn clone(&self) -> Self {
        Self {
            embedder: self.embedder.clone(),
            dedup: self.dedup.clone(),
            keyword: Arc::clone(&self.keyword),
            vectors: Arc::clone(&self.vectors),
            searcher: self.searcher.clone(),
        }
    }
}

impl<P, T1, T2, S, K, V> std::fmt::Debug for MatchEngine<P, T1, T2, S, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine").finish_non_exhaustive()
    }
}

/// Production wiring: HTTP embeddings, moka + SQLite cache, SQLite dedup and FTS5, Qdrant.
pub type SqliteMatchEngine = MatchEngine<
    HttpEmbeddingProvider,
    MokaTier1Store,
    SqliteTier2Store,
    SqliteCanonicalStore,
    SqliteKeywordIndex,
    QdrantVectorIndex,
>;

impl<P, T1, T2, S, K, V> MatchEngine<P, T1, T2, S, K, V>
where
    P: EmbeddingProvider,
    T1: Tier1Store,
    T2: Tier2Store,
    S: CanonicalStore,
    K: KeywordIndex,
    V: VectorIndex,
{
    pub fn new(
        generator: Arc<EmbeddingGenerator<P>>,
        cache: TieredCache<T1, T2>,
        dedup: DedupEngine<S>,
        keyword: Arc<K>,
        vectors: Arc<V>,
    ) -> Self {
        let embedder = CachedEmbedder::new(generator, cache);
        let searcher = HybridSearcher::new(
            Arc::clone(&keyword),
            Arc::clone(&vectors),
            Arc::new(embedder.clone()),
        );
        Self {
            embedder,
            dedup,
            keyword,
            vectors,
            searcher,
        }
    }

    pub fn embedder(&self) -> &CachedEmbedder<P, T1, T2> {
        &self.embedder
    }

    pub fn cache(&self) -> &TieredCache<T1, T2> {
        self.embedder.cache()
    }

    pub fn dedup(&self) -> &DedupEngine<S> {
        &self.dedup
    }

    pub fn keyword_index(&self) -> &K {
        &self.keyword
    }

    pub fn vector_index(&self) -> &V {
        &self.vectors
    }

    /// Creates the vector collection if it does not exist yet.
    pub async fn ensure_ready(&self) -> MatchResult<()> {
        self.vectors.ensure_collection().await?;
        Ok(())
    }

    pub async fn ingest_job(&self, job: JobRecord) -> MatchResult<IngestReport> {
        self.ingest_job_cancellable(job, &CancellationToken::new())
            .await
    }

    /// Deduplicates `job`, indexes it for keyword search and, for a canonical job,
    /// starts embedding and vector indexing in the background.
    ///
    /// Duplicates are never embedded. Re-ingesting the canonical record runs indexing
    /// again, which repairs a failed background run; the embedding usually comes from
    /// the cache and the vector upsert overwrites.
    ///
    /// # Cancellation
    ///
    /// `cancel` reaches into the background task: cancelling it after this call returns
    /// still aborts a pending embedding, and the task resolves to
    /// [`ErrorKind::Cancelled`](super::error::ErrorKind::Cancelled). Do not pass a
    /// request-scoped token (e.g. one behind a `DropGuard`) when indexing must outlive
    /// the request; use [`ingest_job`](Self::ingest_job) or a dedicated token.
    #[instrument(skip(self, job, cancel), fields(job_id = %job.id, user_id = %job.user_id))]
    pub async fn ingest_job_cancellable(
        &self,
        mut job: JobRecord,
        cancel: &CancellationToken,
    ) -> MatchResult<IngestReport> {
        let outcome = self.dedup.ingest_cancellable(&job, cancel).await?;
        outcome.apply_to(&mut job);

        let keyword_indexed = match self.keyword.index_job(&job).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Keyword indexing failed, job will not match keyword queries");
                false
            }
        };

        let embedding_task = if outcome.is_new_canonical {
            Some(self.spawn_vector_indexing(job.clone(), cancel.clone()))
        } else if outcome.is_canonical_repeat(&job.id) {
            debug!("Canonical job ingested again, re-running vector indexing");
            Some(self.spawn_vector_indexing(job.clone(), cancel.clone()))
        } else {
            debug!(canonical_id = %outcome.canonical_id, "Duplicate job, skipping embedding");
            None
        };

        Ok(IngestReport {
            job,
            outcome,
            keyword_indexed,
            embedding_task,
        })
    }

    fn spawn_vector_indexing(
        &self,
        job: JobRecord,
        cancel: CancellationToken,
    ) -> JoinHandle<MatchResult<()>> {
        let embedder = self.embedder.clone();
        let vectors = Arc::clone(&self.vectors);

        tokio::spawn(async move {
            let result = index_job_vector(&embedder, vectors.as_ref(), &job, &cancel).await;
            match &result {
                Ok(()) => info!(job_id = %job.id, "Job embedded and indexed"),
                Err(e) => warn!(job_id = %job.id, error = %e, "Background job indexing failed"),
            }
            result
        })
    }

    /// Embedding of the profile's canonical text, from cache when possible.
    #[instrument(skip(self, profile), fields(user_id = %profile.user_id))]
    pub async fn profile_embedding(
        &self,
        profile: &CandidateProfile,
    ) -> MatchResult<EmbeddingVector> {
        let text = build_profile_text(profile)?;
        Ok(self.embedder.embed(&text).await?)
    }

    /// Ranks `jobs` by semantic similarity to `profile`, best first.
    ///
    /// Every job is embedded through the cache; one failure fails the whole ranking.
    #[instrument(skip(self, profile, jobs), fields(user_id = %profile.user_id, jobs = jobs.len()))]
    pub async fn score_jobs(
        &self,
        profile: &CandidateProfile,
        jobs: Vec<JobRecord>,
    ) -> MatchResult<Vec<RankedResult<JobRecord>>> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.profile_embedding(profile).await?;

        let embeddings = try_join_all(jobs.iter().map(|job| async move {
            let text = build_job_text(job)?;
            self.embedder.embed(&text).await
        }))
        .await?;

        let candidates = jobs
            .into_iter()
            .zip(embeddings)
            .map(|(job, vector)| {
                SimilarityCandidate::new(job.id.clone(), job, vector.into_inner())
            })
            .collect();

        let ranked = rank_by_similarity(query.as_slice(), candidates)?;
        debug!(ranked = ranked.len(), "Scored jobs against profile");
        Ok(ranked)
    }

    pub async fn hybrid_search(
        &self,
        query: &str,
        user_id: &str,
        top_k: usize,
        weights: HybridWeights,
    ) -> MatchResult<HybridSearchResponse> {
        Ok(self.searcher.search(query, user_id, top_k, weights).await?)
    }

    /// Cached compatibility analysis, or a fresh one from `analyzer` stored for next time.
    #[instrument(
        skip(self, profile, job, analyzer),
        fields(user_id = %profile.user_id, job_id = %job.id)
    )]
    pub async fn compatibility<A: CompatibilityAnalyzer>(
        &self,
        profile: &CandidateProfile,
        job: &JobRecord,
        analyzer: &A,
    ) -> MatchResult<CompatibilityAnalysis> {
        if profile.user_id != job.user_id {
            return Err(MatchError::InvalidInput {
                reason: "job belongs to a different user".to_string(),
            });
        }

        let cache = self.embedder.cache();
        let cached = cache.get_analysis(&profile.user_id, &job.id).await;
        if let Some(analysis) = cached.into_value() {
            debug!("Analysis served from cache");
            return Ok(analysis);
        }

        let analysis = analyzer.analyze(profile, job).await?;
        if !cache.put_analysis(&analysis).await.is_durable() {
            warn!("Analysis computed but not durably cached");
        }
        info!(overall = analysis.scores.overall, "Compatibility analyzed");
        Ok(analysis)
    }

    /// Drops the user's cached analyses after a material profile edit.
    ///
    /// Returns `None` when `change` does not affect match quality.
    #[instrument(skip(self))]
    pub async fn on_profile_changed(
        &self,
        user_id: &str,
        change: ProfileChange,
    ) -> MatchResult<Option<InvalidationReport>> {
        if user_id.trim().is_empty() {
            return Err(MatchError::InvalidInput {
                reason: "user id is empty".to_string(),
            });
        }
        if !change.is_material() {
            debug!("Cosmetic profile change, keeping cached analyses");
            return Ok(None);
        }

        let report = self
            .embedder
            .cache()
            .invalidate_analyses(user_id, None)
            .await?;
        Ok(Some(report))
    }

    /// Removes a job from both search indexes. Returns whether the keyword index held it.
    #[instrument(skip(self))]
    pub async fn remove_job(&self, job_id: &str) -> MatchResult<bool> {
        let ids = [job_id.to_string()];
        let (keyword, vectors) =
            tokio::join!(self.keyword.remove_job(job_id), self.vectors.delete(&ids));
        vectors?;
        Ok(keyword?)
    }
}

async fn index_job_vector<P, T1, T2, V>(
    embedder: &CachedEmbedder<P, T1, T2>,
    vectors: &V,
    job: &JobRecord,
    cancel: &CancellationToken,
) -> MatchResult<()>
where
    P: EmbeddingProvider,
    T1: Tier1Store,
    T2: Tier2Store,
    V: VectorIndex,
{
    let text = build_job_text(job)?;
    let vector = embedder.embed_cancellable(&text, cancel).await?;
    let point = JobVectorPoint::new(&job.id, &job.user_id, &vector)
        .with_indexed_at(now_millis());
    vectors.upsert(vec![point], WriteConsistency::Strong).await?;
    Ok(())
}

#[cfg(any(test, feature = "mock"))]
mod mock_engine {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::cache::{InMemoryTier1Store, InMemoryTier2Store, TieredCache};
    use crate::dedup::{DedupEngine, InMemoryCanonicalStore};
    use crate::embedding::{EmbeddingGenerator, GeneratorConfig, MockEmbeddingProvider};
    use crate::search::MockKeywordIndex;
    use crate::vectordb::{DEFAULT_VECTOR_SIZE, MockVectorIndex};

    use super::super::error::MatchResult;
    use super::MatchEngine;

    /// Fully in-memory engine for tests.
    pub type MockMatchEngine = MatchEngine<
        MockEmbeddingProvider,
        InMemoryTier1Store,
        InMemoryTier2Store,
        InMemoryCanonicalStore,
        MockKeywordIndex,
        MockVectorIndex,
    >;

    impl MockMatchEngine {
        /// In-memory engine with a single-attempt generator so injected failures surface
        /// immediately.
        pub fn new_mock() -> MatchResult<Self> {
            let config = GeneratorConfig::default()
                .with_max_attempts(1)
                .with_retry_base(Duration::from_millis(1));
            let generator = EmbeddingGenerator::new(MockEmbeddingProvider::new(), config)?;

            Ok(Self::new(
                Arc::new(generator),
                TieredCache::new_mock(),
                DedupEngine::new(Arc::new(InMemoryCanonicalStore::new())),
                Arc::new(MockKeywordIndex::new()),
                Arc::new(MockVectorIndex::new(DEFAULT_VECTOR_SIZE)),
            ))
        }
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock_engine::MockMatchEngine;

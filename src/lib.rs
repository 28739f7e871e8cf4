//! Semantic job-matching engine.
//!
//! Embeds job listings and candidate profiles, deduplicates listings scraped from
//! several sources, caches embeddings and compatibility analyses in two tiers, and
//! ranks jobs for a candidate by cosine similarity or by a hybrid keyword + semantic
//! search.
//!
//! # Public API Surface
//!
//! ## Orchestration
//! - [`MatchEngine`], [`build_engine`] - The pipeline most callers need
//! - [`MatchError`], [`ErrorKind`] - Errors with user-facing message mapping
//! - [`CompatibilityAnalyzer`], [`SkillGapAnalyzer`] - Per-job compatibility reports
//!
//! ## Components
//! - [`EmbeddingGenerator`], [`EmbeddingVector`] - Embedding generation
//! - [`TieredCache`] - Tier-1 (moka) and tier-2 (SQLite) cache
//! - [`DedupEngine`] - Canonical job records
//! - [`HybridSearcher`] - Keyword + semantic search
//! - [`VectorIndex`], [`QdrantVectorIndex`] - Vector storage
//! - [`cosine_similarity`], [`rank_by_similarity`], [`hybrid_score`] - Vector math
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod dedup;
pub mod embedding;
pub mod hashing;
pub mod matcher;
pub mod model;
pub mod scoring;
pub mod search;
pub mod storage;
pub mod telemetry;
pub mod vectordb;

#[cfg(any(test, feature = "mock"))]
pub use cache::MockTieredCache;
pub use cache::{CacheError, CacheKey, CacheLookup, SqliteTieredCache, TieredCache};

pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, EMBEDDING_DIM, validate_embedding_dim};

#[cfg(any(test, feature = "mock"))]
pub use dedup::InMemoryCanonicalStore;
pub use dedup::{DedupEngine, DedupError, IdentityHash, IngestOutcome, identify};

#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbeddingProvider;
pub use embedding::{
    EmbeddingError, EmbeddingGenerator, EmbeddingProvider, EmbeddingVector, GeneratorConfig,
    HttpEmbeddingProvider, ProviderConfig, build_job_text, build_profile_text,
};

pub use hashing::{canonicalize_text, content_address, hash_to_u64, point_id_for_job};

#[cfg(any(test, feature = "mock"))]
pub use matcher::MockMatchEngine;
pub use matcher::{
    AnalysisError, BuildError, CompatibilityAnalyzer, ErrorKind, IngestReport, MatchEngine,
    MatchError, MatchResult, SkillGapAnalyzer, SqliteMatchEngine, build_engine,
};

pub use model::{
    AnalysisScores, CandidateProfile, CanonicalJobMetadata, CompatibilityAnalysis, JobRecord,
    JobSource, ProfileChange, SalaryRange, WorkExperience,
};

pub use scoring::{
    HybridWeights, RankedResult, ScoringError, SimilarityCandidate, cosine_similarity,
    hybrid_score, rank_by_similarity,
};

#[cfg(any(test, feature = "mock"))]
pub use search::MockKeywordIndex;
pub use search::{
    HybridHit, HybridSearchResponse, HybridSearcher, KeywordIndex, SearchError,
    SqliteKeywordIndex,
};

pub use storage::{Database, StorageError};

#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorIndex;
pub use vectordb::{QdrantVectorIndex, VectorDbError, VectorIndex, VectorMatch};

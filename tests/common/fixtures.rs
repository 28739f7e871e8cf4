//! Shared builders for integration tests.

use std::path::Path;
use std::sync::Arc;

use jobmatch::cache::{CacheConfig, MokaTier1Store, SqliteTier2Store};
use jobmatch::dedup::SqliteCanonicalStore;
use jobmatch::{
    AnalysisError, CandidateProfile, CompatibilityAnalysis, CompatibilityAnalyzer, Database,
    DedupEngine, EmbeddingGenerator, GeneratorConfig, JobRecord, JobSource, MatchEngine,
    MockEmbeddingProvider, MockVectorIndex, SalaryRange, SqliteKeywordIndex, SqliteTieredCache,
    WorkExperience,
};

/// SQLite-backed engine with a mock embedding model and an in-memory vector index.
pub type TestEngine = MatchEngine<
    MockEmbeddingProvider,
    MokaTier1Store,
    SqliteTier2Store,
    SqliteCanonicalStore,
    SqliteKeywordIndex,
    MockVectorIndex,
>;

pub fn open_engine(path: &Path, vectors: Arc<MockVectorIndex>) -> anyhow::Result<TestEngine> {
    let db = Database::open(path)?;
    let generator = EmbeddingGenerator::new(
        MockEmbeddingProvider::new(),
        GeneratorConfig::default().with_max_attempts(1),
    )?;
    let cache = SqliteTieredCache::open(db.clone(), CacheConfig::default())?;
    let dedup = DedupEngine::new(Arc::new(SqliteCanonicalStore::new(db.clone())));
    let keyword = Arc::new(SqliteKeywordIndex::new(db));

    Ok(MatchEngine::new(
        Arc::new(generator),
        cache,
        dedup,
        keyword,
        vectors,
    ))
}

pub fn provider(engine: &TestEngine) -> &MockEmbeddingProvider {
    engine.embedder().generator().provider()
}

pub fn job(id: &str, user: &str, title: &str, company: &str) -> JobRecord {
    JobRecord::new(id, user, title, company, "Berlin, DE", JobSource::Linkedin)
        .with_description(format!(
            "{} at {}. You will design services and own them in production.",
            title, company
        ))
        .with_skills(["Rust", "PostgreSQL"], ["Kubernetes"])
        .with_salary(SalaryRange {
            min: Some(70_000),
            max: Some(95_000),
            currency: "EUR".to_string(),
        })
}

pub fn profile(user: &str) -> CandidateProfile {
    CandidateProfile::new(user)
        .with_headline("Backend Engineer")
        .with_summary("Eight years building distributed systems.")
        .with_experience(
            WorkExperience::new("Senior Rust Engineer", "Initech")
                .with_description("Built the payments ledger."),
        )
        .with_skills(["Rust", "PostgreSQL", "Go"])
}

/// Analyzer that always fails; proves a result came from the cache.
pub struct UnreachableAnalyzer;

impl CompatibilityAnalyzer for UnreachableAnalyzer {
    async fn analyze(
        &self,
        _profile: &CandidateProfile,
        _job: &JobRecord,
    ) -> Result<CompatibilityAnalysis, AnalysisError> {
        Err(AnalysisError::new("analyzer should not be called"))
    }
}

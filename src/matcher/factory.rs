//! Builds a production [`SqliteMatchEngine`] from [`Config`].

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::cache::{CacheConfig, CacheError, SqliteTieredCache};
use crate::config::{Config, ConfigError};
use crate::dedup::{DedupEngine, SqliteCanonicalStore};
use crate::embedding::{
    EmbeddingError, EmbeddingGenerator, GeneratorConfig, HttpEmbeddingProvider, ProviderConfig,
};
use crate::search::SqliteKeywordIndex;
use crate::storage::{Database, StorageError};
use crate::vectordb::{DEFAULT_VECTOR_SIZE, QdrantVectorIndex, VectorDbError};

use super::engine::SqliteMatchEngine;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("embedding setup failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("cache setup failed: {0}")]
    Cache(#[from] CacheError),

    #[error("vector index setup failed: {0}")]
    VectorDb(#[from] VectorDbError),
}

/// Validates `config`, opens the database and wires every component.
///
/// Does not contact Qdrant; call [`SqliteMatchEngine::ensure_ready`] before the first
/// ingest.
pub fn build_engine(config: &Config) -> Result<SqliteMatchEngine, BuildError> {
    config.validate()?;

    let db = Database::open(&config.database_path)?;

    let provider = HttpEmbeddingProvider::new(&ProviderConfig::from(config))?;
    let generator = EmbeddingGenerator::new(provider, GeneratorConfig::from(config))?;
    let cache = SqliteTieredCache::open(db.clone(), CacheConfig::from(config))?;
    let dedup = DedupEngine::new(Arc::new(SqliteCanonicalStore::new(db.clone())));
    let keyword = SqliteKeywordIndex::new(db);
    let vectors =
        QdrantVectorIndex::new(&config.qdrant_url, &config.collection, DEFAULT_VECTOR_SIZE)?;

    info!(
        database = %config.database_path.display(),
        qdrant_url = %config.qdrant_url,
        collection = %config.collection,
        "Match engine initialized"
    );

    Ok(SqliteMatchEngine::new(
        Arc::new(generator),
        cache,
        dedup,
        Arc::new(keyword),
        Arc::new(vectors),
    ))
}

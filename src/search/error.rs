use thiserror::Error;

use crate::scoring::ScoringError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search request: {reason}")]
    InvalidInput { reason: String },

    #[error("invalid weights: {0}")]
    Weights(#[from] ScoringError),

    #[error("keyword index error: {0}")]
    Storage(#[from] StorageError),

    #[error("keyword index error: {reason}")]
    Keyword { reason: String },

    #[error("semantic search error: {reason}")]
    Semantic { reason: String },

    /// Both sources failed; nothing can be returned.
    #[error("search unavailable (keyword: {keyword}; semantic: {semantic})")]
    Unavailable { keyword: String, semantic: String },
}

pub type SearchResult<T> = Result<T, SearchError>;

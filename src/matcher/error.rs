use thiserror::Error;

use crate::cache::CacheError;
use crate::dedup::DedupError;
use crate::embedding::EmbeddingError;
use crate::scoring::ScoringError;
use crate::search::SearchError;
use crate::vectordb::VectorDbError;

use super::analyzer::AnalysisError;

use crate::search::HybridSearchResponse;

pub const PROFILE_INCOMPLETE_MESSAGE: &str = "Cannot generate match: profile incomplete.";
pub const SEARCH_DEGRADED_MESSAGE: &str = "Search temporarily degraded: showing partial results.";
pub const SEARCH_UNAVAILABLE_MESSAGE: &str = "Search temporarily unavailable: try again.";
pub const ANALYSIS_UNAVAILABLE_MESSAGE: &str = "Job analysis unavailable: try again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong: try again.";

/// Notice to show next to partial search results, if any.
pub fn degraded_notice(response: &HybridSearchResponse) -> Option<&'static str> {
    response.is_degraded().then_some(SEARCH_DEGRADED_MESSAGE)
}

/// Coarse classification of a [`MatchError`] for callers deciding what to show or retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed arguments; a caller bug, never retried.
    InvalidInput,
    /// A stored or returned vector is corrupt.
    DataIntegrity,
    /// The embedding model could not be reached within the retry budget.
    EmbeddingUnavailable,
    /// The profile has too little content to embed.
    InsufficientData,
    SearchUnavailable,
    AnalysisUnavailable,
    Storage,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Dedup(#[from] DedupError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    VectorDb(#[from] VectorDbError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("background task failed: {reason}")]
    Task { reason: String },
}

impl MatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatchError::InvalidInput { .. } => ErrorKind::InvalidInput,
            MatchError::Embedding(e) => match e {
                EmbeddingError::InsufficientData { .. } => ErrorKind::InsufficientData,
                EmbeddingError::GenerationFailed { .. } => ErrorKind::EmbeddingUnavailable,
                EmbeddingError::Cancelled => ErrorKind::Cancelled,
                EmbeddingError::EmptyInput | EmbeddingError::InvalidConfig { .. } => {
                    ErrorKind::InvalidInput
                }
                EmbeddingError::DimensionMismatch { .. }
                | EmbeddingError::InvalidVector { .. }
                | EmbeddingError::InvalidBytes { .. } => ErrorKind::DataIntegrity,
            },
            MatchError::Scoring(e) if e.is_data_integrity() => ErrorKind::DataIntegrity,
            MatchError::Scoring(_) => ErrorKind::InvalidInput,
            MatchError::Dedup(e) => match e {
                DedupError::InvalidInput { .. } => ErrorKind::InvalidInput,
                DedupError::Cancelled => ErrorKind::Cancelled,
                DedupError::Storage(_) | DedupError::Store { .. } => ErrorKind::Storage,
            },
            MatchError::Search(e) => match e {
                SearchError::InvalidInput { .. } | SearchError::Weights(_) => {
                    ErrorKind::InvalidInput
                }
                SearchError::Storage(_)
                | SearchError::Keyword { .. }
                | SearchError::Semantic { .. }
                | SearchError::Unavailable { .. } => ErrorKind::SearchUnavailable,
            },
            MatchError::VectorDb(e) if !e.is_transient() => ErrorKind::DataIntegrity,
            MatchError::VectorDb(_) | MatchError::Cache(_) | MatchError::Task { .. } => {
                ErrorKind::Storage
            }
            MatchError::Analysis(_) => ErrorKind::AnalysisUnavailable,
        }
    }

    /// Message safe to show an end user. Never includes the underlying error text.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InsufficientData => PROFILE_INCOMPLETE_MESSAGE,
            ErrorKind::SearchUnavailable => SEARCH_UNAVAILABLE_MESSAGE,
            ErrorKind::EmbeddingUnavailable | ErrorKind::AnalysisUnavailable => {
                ANALYSIS_UNAVAILABLE_MESSAGE
            }
            ErrorKind::InvalidInput
            | ErrorKind::DataIntegrity
            | ErrorKind::Storage
            | ErrorKind::Cancelled => GENERIC_FAILURE_MESSAGE,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::EmbeddingUnavailable
                | ErrorKind::SearchUnavailable
                | ErrorKind::AnalysisUnavailable
                | ErrorKind::Storage
        )
    }
}

pub type MatchResult<T> = Result<T, MatchError>;

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum DedupError {
    #[error("invalid job identity: {reason}")]
    InvalidInput { reason: String },

    #[error("canonical store error: {0}")]
    Storage(#[from] StorageError),

    #[error("canonical store error: {reason}")]
    Store { reason: String },

    #[error("ingestion cancelled")]
    Cancelled,
}

pub type DedupResult<T> = Result<T, DedupError>;

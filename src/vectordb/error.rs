use thiserror::Error;

use crate::constants::DimValidationError;

/// Vector index failures. The message text goes to logs only.
#[derive(Debug, Error)]
pub enum VectorDbError {
    #[error("vector index unreachable at '{url}': {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("could not create job collection '{collection}': {message}")]
    CreateCollectionFailed { collection: String, message: String },

    /// The collection is missing; run `ensure_collection` first.
    #[error("job collection '{collection}' does not exist")]
    CollectionNotFound { collection: String },

    #[error("job vector upsert into '{collection}' failed: {message}")]
    UpsertFailed { collection: String, message: String },

    #[error("nearest-neighbour query on '{collection}' failed: {message}")]
    SearchFailed { collection: String, message: String },

    /// A vector of the wrong length reached the index. Points at corrupt input, not an outage.
    #[error("job vector has {actual} dimensions, index expects {expected}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("job vector delete from '{collection}' failed: {message}")]
    DeleteFailed { collection: String, message: String },

    #[error("vector index configured with zero dimensions")]
    ZeroVectorSize,
}

impl From<DimValidationError> for VectorDbError {
    fn from(e: DimValidationError) -> Self {
        match e {
            DimValidationError::DimensionMismatch { expected, actual } => {
                VectorDbError::InvalidDimension { expected, actual }
            }
            DimValidationError::ZeroDimension => VectorDbError::ZeroVectorSize,
        }
    }
}

impl VectorDbError {
    /// Errors worth retrying later; everything except dimension problems.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            VectorDbError::InvalidDimension { .. } | VectorDbError::ZeroVectorSize
        )
    }
}

pub type VectorDbResult<T> = Result<T, VectorDbError>;

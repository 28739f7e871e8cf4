use thiserror::Error;

use crate::constants::DimValidationError;

/// A single failed call to the embedding provider.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    #[error("embedding request failed: {message}")]
    Http { message: String },

    #[error("embedding provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode embedding response: {message}")]
    Decode { message: String },

    #[error("embedding provider returned no vectors")]
    EmptyResponse,

    #[error("embedding provider unavailable: {reason}")]
    Unavailable { reason: String },
}

impl ProviderError {
    /// Client errors other than timeouts and rate limits will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Status { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            ProviderError::Http { .. }
            | ProviderError::Decode { .. }
            | ProviderError::EmptyResponse
            | ProviderError::Unavailable { .. } => true,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode {
                message: err.to_string(),
            }
        } else {
            ProviderError::Http {
                message: err.to_string(),
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding input is empty")]
    EmptyInput,

    /// The record has no text worth embedding (e.g. an unfilled profile).
    #[error("not enough {subject} data to build embedding text")]
    InsufficientData { subject: &'static str },

    #[error("embedding generation failed after {attempts} attempt(s): {source}")]
    GenerationFailed {
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid embedding: {reason}")]
    InvalidVector { reason: String },

    #[error("embedding generation cancelled")]
    Cancelled,

    #[error("invalid embedding configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid embedding bytes: expected {expected} bytes, got {actual}")]
    InvalidBytes { expected: usize, actual: usize },
}

impl EmbeddingError {
    /// Errors that mean a vector is corrupt rather than merely unavailable.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            EmbeddingError::DimensionMismatch { .. }
                | EmbeddingError::InvalidVector { .. }
                | EmbeddingError::InvalidBytes { .. }
        )
    }
}

impl From<DimValidationError> for EmbeddingError {
    fn from(e: DimValidationError) -> Self {
        match e {
            DimValidationError::DimensionMismatch { expected, actual } => {
                EmbeddingError::DimensionMismatch { expected, actual }
            }
            DimValidationError::ZeroDimension => EmbeddingError::InvalidConfig {
                reason: e.to_string(),
            },
        }
    }
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

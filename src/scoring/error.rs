use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoringError {
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid vector: {reason}")]
    InvalidVector { reason: String },

    #[error("zero-magnitude vector: cosine similarity is undefined")]
    ZeroVector,

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("{name} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A ranking candidate failed validation; `id` names the offending candidate.
    #[error("candidate {id}: {source}")]
    Candidate {
        id: String,
        #[source]
        source: Box<ScoringError>,
    },
}

impl ScoringError {
    /// Returns `true` for errors that indicate corrupt stored vectors rather than caller bugs.
    pub fn is_data_integrity(&self) -> bool {
        match self {
            ScoringError::DimensionMismatch { .. }
            | ScoringError::ZeroVector
            | ScoringError::InvalidVector { .. } => true,
            ScoringError::Candidate { source, .. } => source.is_data_integrity(),
            ScoringError::InvalidInput { .. } | ScoringError::OutOfRange { .. } => false,
        }
    }
}

pub type ScoringResult<T> = Result<T, ScoringError>;

use serde::{Deserialize, Serialize};

use crate::constants::{EMBEDDING_DIM, EMBEDDING_F32_BYTES, validate_embedding_dim};

use super::error::{EmbeddingError, EmbeddingResult};

/// A validated, immutable embedding of exactly [`EMBEDDING_DIM`] finite values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct EmbeddingVector {
    values: Vec<f32>,
}

impl EmbeddingVector {
    /// Wraps `values`, rejecting wrong lengths, non-finite elements and all-zero vectors.
    pub fn try_new(values: Vec<f32>) -> EmbeddingResult<Self> {
        validate_embedding_dim(values.len(), EMBEDDING_DIM)?;
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(EmbeddingError::InvalidVector {
                reason: format!("non-finite element at index {}", i),
            });
        }
        if values.iter().all(|&v| v == 0.0) {
            return Err(EmbeddingError::InvalidVector {
                reason: "zero-magnitude vector".to_string(),
            });
        }
        Ok(Self { values })
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.values
    }

    /// Little-endian `f32` encoding, [`EMBEDDING_F32_BYTES`] long.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(EMBEDDING_F32_BYTES);
        for v in &self.values {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }

    pub fn from_le_bytes(bytes: &[u8]) -> EmbeddingResult<Self> {
        if bytes.len() != EMBEDDING_F32_BYTES {
            return Err(EmbeddingError::InvalidBytes {
                expected: EMBEDDING_F32_BYTES,
                actual: bytes.len(),
            });
        }
        let values = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Self::try_new(values)
    }
}

impl TryFrom<Vec<f32>> for EmbeddingVector {
    type Error = EmbeddingError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::try_new(values)
    }
}

impl From<EmbeddingVector> for Vec<f32> {
    fn from(v: EmbeddingVector) -> Self {
        v.values
    }
}

impl AsRef<[f32]> for EmbeddingVector {
    fn as_ref(&self) -> &[f32] {
        &self.values
    }
}

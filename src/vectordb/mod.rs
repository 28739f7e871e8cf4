//! Vector index for canonical job embeddings.
//!
//! Points carry `job_id` and `user_id` in their payload. The index filters on `user_id`
//! when asked to, but callers must still check tenancy on every match they use.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{QdrantVectorIndex, VectorIndex};
pub use error::{VectorDbError, VectorDbResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockVectorIndex;
pub use model::{JobVectorPoint, VectorMatch};

pub const DEFAULT_COLLECTION_NAME: &str = "job_embeddings";

pub const DEFAULT_VECTOR_SIZE: u64 = crate::constants::EMBEDDING_DIM_U64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteConsistency {
    /// Wait for the operation to be fully indexed and searchable.
    /// Maps to `wait=true`.
    Strong,
    /// Return once the server acknowledges receipt; the point may not be searchable yet.
    /// Maps to `wait=false`.
    Eventual,
}

impl From<WriteConsistency> for bool {
    fn from(c: WriteConsistency) -> bool {
        matches!(c, WriteConsistency::Strong)
    }
}

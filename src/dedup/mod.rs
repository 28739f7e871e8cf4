//! Canonical deduplication of ingested job records.
//!
//! [`identify`] hashes a job's normalized company, title and location. [`DedupEngine`]
//! registers that hash through a [`CanonicalStore`], whose `register` is a single
//! insert-or-increment so concurrent ingestion of the same job yields one canonical row.

mod engine;
mod error;
mod identity;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod store;


pub use engine::{DedupEngine, IngestOutcome};
pub use error::{DedupError, DedupResult};
pub use identity::{IdentityHash, identify, normalize_field};
#[cfg(any(test, feature = "mock"))]
pub use mock::InMemoryCanonicalStore;
pub use store::{CanonicalStore, Registration, SqliteCanonicalStore};

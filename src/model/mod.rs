//! Records the engine reads from the surrounding product and the analyses it produces.
//!
//! Job and profile records are owned by the external CRUD layer. The engine only writes
//! [`JobRecord::canonical_id`] (once, during ingestion) and the canonical metadata rows.

mod analysis;
mod job;
mod profile;

pub use analysis::{AnalysisScores, CompatibilityAnalysis};
pub use job::{CanonicalJobMetadata, JobRecord, JobSource, SalaryRange};
pub use profile::{CandidateProfile, ProfileChange, WorkExperience};

//! Orchestration of the matching pipeline.
//!
//! [`MatchEngine`] owns one of each component and exposes the operations the product
//! calls: job ingestion, profile embedding, job scoring, hybrid search, compatibility
//! analysis and profile-change invalidation. [`build_engine`] wires the production
//! backends from [`Config`](crate::config::Config).

pub mod analyzer;
mod embedder;
mod engine;
pub mod error;
mod factory;


pub use analyzer::{AnalysisError, CompatibilityAnalyzer, SkillGapAnalyzer};
pub use embedder::CachedEmbedder;
#[cfg(any(test, feature = "mock"))]
pub use engine::MockMatchEngine;
pub use engine::{IngestReport, MatchEngine, SqliteMatchEngine};
pub use error::{ErrorKind, MatchError, MatchResult, degraded_notice};
pub use factory::{BuildError, build_engine};

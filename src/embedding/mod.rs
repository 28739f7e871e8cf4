//! Embedding generation.
//!
//! - [`EmbeddingGenerator`] wraps an [`EmbeddingProvider`] with truncation, bounded retry,
//!   cancellation and dimension validation.
//! - [`build_job_text`] / [`build_profile_text`] produce the text that gets embedded.
//! - [`EmbeddingVector`] is the only vector type that leaves this module.

pub mod config;
mod error;
mod generator;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod provider;
pub mod text;
mod vector;

#[cfg(test)]
mod tests;

pub use config::{GeneratorConfig, ProviderConfig};
pub use error::{EmbeddingError, EmbeddingResult, ProviderError};
pub use generator::EmbeddingGenerator;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbeddingProvider;
pub use provider::{EmbeddingProvider, HttpEmbeddingProvider};
pub use text::{build_job_text, build_profile_text};
pub use vector::EmbeddingVector;

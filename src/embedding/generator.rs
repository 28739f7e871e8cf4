use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use crate::constants::validate_embedding_dim;

use super::config::GeneratorConfig;
use super::error::{EmbeddingError, EmbeddingResult};
use super::provider::EmbeddingProvider;
use super::vector::EmbeddingVector;

/// Turns text into a validated [`EmbeddingVector`] through a retrying provider call.
#[derive(Debug)]
pub struct EmbeddingGenerator<P> {
    provider: P,
    config: GeneratorConfig,
}

impl<P: EmbeddingProvider> EmbeddingGenerator<P> {
    pub fn new(provider: P, config: GeneratorConfig) -> EmbeddingResult<Self> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Embeds `text`, retrying provider failures with exponential backoff.
    ///
    /// Wrap the call in `tokio::time::timeout` to bound total wall-clock time; dropping
    /// the future abandons any remaining attempts.
    pub async fn generate(&self, text: &str) -> EmbeddingResult<EmbeddingVector> {
        self.generate_cancellable(text, &CancellationToken::new())
            .await
    }

    /// Like [`generate`](Self::generate), but `cancel` aborts the in-flight provider call
    /// and any pending backoff with [`EmbeddingError::Cancelled`].
    #[instrument(skip(self, text, cancel), fields(text_len = text.len()))]
    pub async fn generate_cancellable(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> EmbeddingResult<EmbeddingVector> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let input = truncate_chars(text, self.config.max_input_chars);
        if input.len() < text.len() {
            debug!(
                max_chars = self.config.max_input_chars,
                original_bytes = text.len(),
                truncated_bytes = input.len(),
                "Truncated embedding input"
            );
        }

        let max_attempts = self.config.max_attempts;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            if cancel.is_cancelled() {
                return Err(EmbeddingError::Cancelled);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(EmbeddingError::Cancelled),
                outcome = self.provider.embed(input) => outcome,
            };

            let err = match outcome {
                Ok(values) => return self.validate_output(values),
                Err(err) => err,
            };

            warn!(attempt, max_attempts, error = %err, "Embedding attempt failed");

            if !err.is_retryable() || attempt >= max_attempts {
                return Err(EmbeddingError::GenerationFailed {
                    attempts: attempt,
                    source: err,
                });
            }

            let delay = self.backoff(attempt);
            debug!(attempt, delay_ms = delay.as_millis() as u64, "Backing off before retry");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(EmbeddingError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Delay after the given failed attempt: `retry_base * 2^(attempt - 1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.config.retry_base.saturating_mul(1u32 << exponent)
    }

    fn validate_output(&self, values: Vec<f32>) -> EmbeddingResult<EmbeddingVector> {
        if let Err(e) = validate_embedding_dim(values.len(), self.config.expected_dim) {
            error!(error = %e, "Embedding provider returned wrong dimension");
            return Err(e.into());
        }

        EmbeddingVector::try_new(values).inspect_err(|e| {
            error!(error = %e, "Embedding provider returned an invalid vector");
        })
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

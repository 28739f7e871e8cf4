use std::time::Duration;

use crate::config::Config;
use crate::constants::{
    DEFAULT_EMBED_MAX_ATTEMPTS, DEFAULT_EMBED_RETRY_BASE, DEFAULT_MAX_INPUT_CHARS, EMBEDDING_DIM,
};

use super::error::{EmbeddingError, EmbeddingResult};

pub const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
/// Retry, truncation and validation settings for [`EmbeddingGenerator`](super::EmbeddingGenerator).
pub struct GeneratorConfig {
    /// Inputs longer than this many characters are truncated before submission.
    pub max_input_chars: usize,
    /// Total provider calls per `generate`, the first one included.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each attempt after that.
    pub retry_base: Duration,
    pub expected_dim: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            max_attempts: DEFAULT_EMBED_MAX_ATTEMPTS,
            retry_base: DEFAULT_EMBED_RETRY_BASE,
            expected_dim: EMBEDDING_DIM,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> EmbeddingResult<()> {
        if self.max_input_chars == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_input_chars must be greater than zero".to_string(),
            });
        }
        if self.max_attempts == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_attempts must be at least 1".to_string(),
            });
        }
        if self.expected_dim != EMBEDDING_DIM {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "expected_dim must be {} (got {})",
                    EMBEDDING_DIM, self.expected_dim
                ),
            });
        }
        Ok(())
    }

    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }
}

impl From<&Config> for GeneratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_input_chars: config.max_input_chars,
            max_attempts: config.embed_max_attempts,
            retry_base: config.embed_retry_base,
            expected_dim: EMBEDDING_DIM,
        }
    }
}

#[derive(Clone)]
/// Connection settings for an OpenAI-compatible `/embeddings` endpoint.
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    /// Requested output dimensionality, sent as `dimensions` in the request body.
    pub dimensions: Option<usize>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EMBEDDING_URL.to_string(),
            api_key: None,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout: DEFAULT_EMBEDDING_TIMEOUT,
            dimensions: Some(EMBEDDING_DIM),
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> EmbeddingResult<()> {
        if self.model.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding model name is required".to_string(),
            });
        }
        if self.base_url.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding base URL is required".to_string(),
            });
        }
        Ok(())
    }

    /// Full URL of the embeddings endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }
}

impl From<&Config> for ProviderConfig {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.embedding_url.clone(),
            api_key: config.embedding_api_key.clone(),
            model: config.embedding_model.clone(),
            timeout: config.embedding_timeout,
            dimensions: Some(EMBEDDING_DIM),
        }
    }
}

//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `JOBMATCH_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    ANALYSIS_TTL, DEFAULT_EMBED_MAX_ATTEMPTS, DEFAULT_EMBED_RETRY_BASE, DEFAULT_MAX_INPUT_CHARS,
    DEFAULT_TIER1_CAPACITY, EMBEDDING_TTL,
};
use crate::embedding::config::{
    DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_TIMEOUT, DEFAULT_EMBEDDING_URL,
};
use crate::vectordb::DEFAULT_COLLECTION_NAME;

/// Engine configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `JOBMATCH_*` overrides on top of defaults.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the OpenAI-compatible embedding API.
    pub embedding_url: String,

    /// Bearer token for the embedding API. Default: unset.
    pub embedding_api_key: Option<String>,

    pub embedding_model: String,

    /// Per-request timeout for embedding calls. Default: 30 s.
    pub embedding_timeout: Duration,

    /// Character ceiling applied before text reaches the model. Default: `8000`.
    pub max_input_chars: usize,

    /// Provider calls per embedding, the first included. Default: `3`.
    pub embed_max_attempts: u32,

    /// Backoff before the second attempt. Default: 500 ms.
    pub embed_retry_base: Duration,

    /// SQLite database file (tier-2 cache, canonical jobs, keyword index).
    /// Default: `./.data/jobmatch.db`.
    pub database_path: PathBuf,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Qdrant collection holding job embeddings. Default: `job_embeddings`.
    pub collection: String,

    /// Max entries in the tier-1 cache. Default: `10_000`.
    pub tier1_capacity: u64,

    pub embedding_ttl: Duration,

    pub analysis_ttl: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("embedding_url", &self.embedding_url)
            .field(
                "embedding_api_key",
                &self.embedding_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("embedding_model", &self.embedding_model)
            .field("embedding_timeout", &self.embedding_timeout)
            .field("max_input_chars", &self.max_input_chars)
            .field("embed_max_attempts", &self.embed_max_attempts)
            .field("embed_retry_base", &self.embed_retry_base)
            .field("database_path", &self.database_path)
            .field("qdrant_url", &self.qdrant_url)
            .field("collection", &self.collection)
            .field("tier1_capacity", &self.tier1_capacity)
            .field("embedding_ttl", &self.embedding_ttl)
            .field("analysis_ttl", &self.analysis_ttl)
            .finish()
    }
}

/// Default Qdrant URL used when `JOBMATCH_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default database file used when `JOBMATCH_DATABASE_PATH` is not set.
pub const DEFAULT_DATABASE_PATH: &str = "./.data/jobmatch.db";

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding_url: DEFAULT_EMBEDDING_URL.to_string(),
            embedding_api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_timeout: DEFAULT_EMBEDDING_TIMEOUT,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            embed_max_attempts: DEFAULT_EMBED_MAX_ATTEMPTS,
            embed_retry_base: DEFAULT_EMBED_RETRY_BASE,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            tier1_capacity: DEFAULT_TIER1_CAPACITY,
            embedding_ttl: EMBEDDING_TTL,
            analysis_ttl: ANALYSIS_TTL,
        }
    }
}

impl Config {
    const ENV_EMBEDDING_URL: &'static str = "JOBMATCH_EMBEDDING_URL";
    const ENV_EMBEDDING_API_KEY: &'static str = "JOBMATCH_EMBEDDING_API_KEY";
    const ENV_EMBEDDING_MODEL: &'static str = "JOBMATCH_EMBEDDING_MODEL";
    const ENV_EMBEDDING_TIMEOUT: &'static str = "JOBMATCH_EMBEDDING_TIMEOUT_SECS";
    const ENV_MAX_INPUT_CHARS: &'static str = "JOBMATCH_MAX_INPUT_CHARS";
    const ENV_EMBED_MAX_ATTEMPTS: &'static str = "JOBMATCH_EMBED_MAX_ATTEMPTS";
    const ENV_EMBED_RETRY_BASE: &'static str = "JOBMATCH_EMBED_RETRY_BASE_MS";
    const ENV_DATABASE_PATH: &'static str = "JOBMATCH_DATABASE_PATH";
    const ENV_QDRANT_URL: &'static str = "JOBMATCH_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "JOBMATCH_COLLECTION";
    const ENV_TIER1_CAPACITY: &'static str = "JOBMATCH_TIER1_CAPACITY";
    const ENV_EMBEDDING_TTL: &'static str = "JOBMATCH_EMBEDDING_TTL_SECS";
    const ENV_ANALYSIS_TTL: &'static str = "JOBMATCH_ANALYSIS_TTL_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// A variable that is set but does not parse is an error rather than a silent default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            embedding_url: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_URL,
                defaults.embedding_url,
            ),
            embedding_api_key: Self::parse_optional_string_from_env(Self::ENV_EMBEDDING_API_KEY),
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            embedding_timeout: Self::parse_secs_from_env(
                Self::ENV_EMBEDDING_TIMEOUT,
                defaults.embedding_timeout,
            )?,
            max_input_chars: Self::parse_number_from_env(
                Self::ENV_MAX_INPUT_CHARS,
                defaults.max_input_chars,
            )?,
            embed_max_attempts: Self::parse_number_from_env(
                Self::ENV_EMBED_MAX_ATTEMPTS,
                defaults.embed_max_attempts,
            )?,
            embed_retry_base: Self::parse_millis_from_env(
                Self::ENV_EMBED_RETRY_BASE,
                defaults.embed_retry_base,
            )?,
            database_path: Self::parse_path_from_env(
                Self::ENV_DATABASE_PATH,
                defaults.database_path,
            ),
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            collection: Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection),
            tier1_capacity: Self::parse_number_from_env(
                Self::ENV_TIER1_CAPACITY,
                defaults.tier1_capacity,
            )?,
            embedding_ttl: Self::parse_secs_from_env(
                Self::ENV_EMBEDDING_TTL,
                defaults.embedding_ttl,
            )?,
            analysis_ttl: Self::parse_secs_from_env(Self::ENV_ANALYSIS_TTL, defaults.analysis_ttl)?,
        })
    }

    /// Checks basic invariants (does not create files or directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embed_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_EMBED_MAX_ATTEMPTS,
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_input_chars == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_INPUT_CHARS,
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.tier1_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TIER1_CAPACITY,
                reason: "must be greater than zero".to_string(),
            });
        }
        for (name, ttl) in [
            (Self::ENV_EMBEDDING_TTL, self.embedding_ttl),
            (Self::ENV_ANALYSIS_TTL, self.analysis_ttl),
        ] {
            if ttl.is_zero() {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: "TTL must be greater than zero".to_string(),
                });
            }
        }
        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_EMBEDDING_MODEL,
                reason: "model name is required".to_string(),
            });
        }
        if self.collection.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_COLLECTION,
                reason: "collection name is required".to_string(),
            });
        }
        if self.database_path.is_dir() {
            return Err(ConfigError::NotAFile {
                path: self.database_path.clone(),
            });
        }

        Ok(())
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_number_from_env<T: std::str::FromStr>(
        var_name: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::ParseError { name: var_name, value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_secs_from_env(var_name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        Self::parse_number_from_env(var_name, default.as_secs()).map(Duration::from_secs)
    }

    fn parse_millis_from_env(
        var_name: &'static str,
        default: Duration,
    ) -> Result<Duration, ConfigError> {
        let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
        Self::parse_number_from_env(var_name, default_ms).map(Duration::from_millis)
    }
}

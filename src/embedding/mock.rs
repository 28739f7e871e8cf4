use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::constants::EMBEDDING_DIM;

use super::error::ProviderError;
use super::provider::EmbeddingProvider;

/// Deterministic in-process provider for tests.
///
/// Vectors are seeded from the BLAKE3 hash of the input, so the same text always maps
/// to the same unit-length vector. Failures, latency and wrong dimensions can be injected.
#[derive(Debug)]
pub struct MockEmbeddingProvider {
    calls: AtomicUsize,
    state: Mutex<MockState>,
}

#[derive(Debug)]
struct MockState {
    dimension: usize,
    fail_remaining: usize,
    failure: ProviderError,
    fixed: HashMap<String, Vec<f32>>,
    delay: Option<Duration>,
    last_input_chars: Option<usize>,
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            state: Mutex::new(MockState {
                dimension: EMBEDDING_DIM,
                fail_remaining: 0,
                failure: ProviderError::Unavailable {
                    reason: "mock failure".to_string(),
                },
                fixed: HashMap::new(),
                delay: None,
                last_input_chars: None,
            }),
        }
    }
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` calls fail with [`ProviderError::Unavailable`].
    pub fn fail_first(&self, n: usize) {
        self.state.lock().fail_remaining = n;
    }

    /// Makes the next `n` calls fail with `error`.
    pub fn fail_with(&self, n: usize, error: ProviderError) {
        let mut state = self.state.lock();
        state.fail_remaining = n;
        state.failure = error;
    }

    pub fn fail_always(&self) {
        self.fail_first(usize::MAX);
    }

    pub fn set_dimension(&self, dimension: usize) {
        self.state.lock().dimension = dimension;
    }

    /// Returns `vector` verbatim whenever `text` is embedded.
    pub fn set_fixed(&self, text: impl Into<String>, vector: Vec<f32>) {
        self.state.lock().fixed.insert(text.into(), vector);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = Some(delay);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Character count of the most recent input, after any truncation by the caller.
    pub fn last_input_chars(&self) -> Option<usize> {
        self.state.lock().last_input_chars
    }

    /// The vector this mock produces for `text` when nothing is injected.
    pub fn vector_for(text: &str) -> Vec<f32> {
        stub_vector(text, EMBEDDING_DIM)
    }
}

impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = {
            let mut state = self.state.lock();
            state.last_input_chars = Some(text.chars().count());
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        if state.fail_remaining > 0 {
            state.fail_remaining -= 1;
            return Err(state.failure.clone());
        }
        if let Some(vector) = state.fixed.get(text) {
            return Ok(vector.clone());
        }

        debug!(text_len = text.len(), "Generating mock embedding");
        Ok(stub_vector(text, state.dimension))
    }
}

fn stub_vector(text: &str, dimension: usize) -> Vec<f32> {
    let hash = blake3::hash(text.as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash.as_bytes()[..8]);
    let mut state = u64::from_le_bytes(seed);

    let mut embedding = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
        embedding.push(value);
    }

    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }
    embedding
}

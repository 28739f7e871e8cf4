use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::model::CanonicalJobMetadata;

use super::error::{DedupError, DedupResult};
use super::identity::IdentityHash;
use super::store::{CanonicalStore, Registration};

#[derive(Debug, Default)]
struct State {
    canonical: HashMap<IdentityHash, CanonicalJobMetadata>,
    links: HashMap<String, IdentityHash>,
}

/// In-memory [`CanonicalStore`]; one mutex makes `register` atomic.
#[derive(Debug, Default)]
pub struct InMemoryCanonicalStore {
    state: Mutex<State>,
    fail: AtomicBool,
}

impl InMemoryCanonicalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn canonical_count(&self) -> usize {
        self.state.lock().canonical.len()
    }

    fn check(&self) -> DedupResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DedupError::Store {
                reason: "mock canonical store failure".to_string(),
            });
        }
        Ok(())
    }
}

impl CanonicalStore for InMemoryCanonicalStore {
    async fn register(
        &self,
        identity: &IdentityHash,
        job_id: &str,
        seen_at: DateTime<Utc>,
    ) -> DedupResult<Registration> {
        self.check()?;
        let mut state = self.state.lock();

        if let Some(linked) = state.links.get(job_id).cloned() {
            let metadata = state
                .canonical
                .get_mut(&linked)
                .ok_or_else(|| DedupError::Store {
                    reason: format!("link for {} points at a missing canonical row", job_id),
                })?;
            metadata.last_seen = metadata.last_seen.max(seen_at);
            return Ok(Registration {
                metadata: metadata.clone(),
                is_new_canonical: false,
                already_linked: true,
            });
        }

        let metadata = state
            .canonical
            .entry(identity.clone())
            .and_modify(|m| {
                m.duplicate_count += 1;
                m.last_seen = m.last_seen.max(seen_at);
            })
            .or_insert_with(|| CanonicalJobMetadata {
                identity_hash: identity.as_str().to_string(),
                canonical_job_id: job_id.to_string(),
                first_seen: seen_at,
                last_seen: seen_at,
                duplicate_count: 1,
            })
            .clone();
        state.links.insert(job_id.to_string(), identity.clone());

        Ok(Registration {
            is_new_canonical: metadata.canonical_job_id == job_id,
            metadata,
            already_linked: false,
        })
    }

    async fn metadata(&self, identity: &IdentityHash) -> DedupResult<Option<CanonicalJobMetadata>> {
        self.check()?;
        Ok(self.state.lock().canonical.get(identity).cloned())
    }

    async fn canonical_for_job(&self, job_id: &str) -> DedupResult<Option<String>> {
        self.check()?;
        let state = self.state.lock();
        Ok(state
            .links
            .get(job_id)
            .and_then(|identity| state.canonical.get(identity))
            .map(|m| m.canonical_job_id.clone()))
    }
}

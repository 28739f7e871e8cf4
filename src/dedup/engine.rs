use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::model::{CanonicalJobMetadata, JobRecord};

use super::error::{DedupError, DedupResult};
use super::identity::{IdentityHash, identify};
use super::store::CanonicalStore;

/// What ingestion decided about one job record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub canonical_id: String,
    /// Only new canonical records get embedded and indexed.
    pub is_new_canonical: bool,
    pub duplicate_count: u64,
    pub identity: IdentityHash,
    /// The same job id had been ingested before; nothing was counted.
    pub already_linked: bool,
}

impl IngestOutcome {
    /// A repeat ingest of the canonical record itself.
    pub fn is_canonical_repeat(&self, job_id: &str) -> bool {
        self.already_linked && self.canonical_id == job_id
    }

    /// Sets `job.canonical_id` when the job turned out to be a duplicate.
    pub fn apply_to(&self, job: &mut JobRecord) {
        if self.canonical_id != job.id {
            job.canonical_id = Some(self.canonical_id.clone());
        }
    }
}

/// Links ingested job records to one canonical record per real-world job.
#[derive(Debug)]
pub struct DedupEngine<S> {
    store: Arc<S>,
}

impl<S> Clone for DedupEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CanonicalStore> DedupEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn ingest(&self, job: &JobRecord) -> DedupResult<IngestOutcome> {
        self.ingest_cancellable(job, &CancellationToken::new()).await
    }

    /// Registers `job` under its identity hash.
    ///
    /// Cancellation is only observed before the store call starts; a registration that
    /// reached the store runs to completion so counts stay consistent.
    #[instrument(skip(self, job, cancel), fields(job_id = %job.id, user_id = %job.user_id))]
    pub async fn ingest_cancellable(
        &self,
        job: &JobRecord,
        cancel: &CancellationToken,
    ) -> DedupResult<IngestOutcome> {
        if job.id.trim().is_empty() {
            return Err(DedupError::InvalidInput {
                reason: "job id is empty".to_string(),
            });
        }
        let identity = identify(&job.company, &job.title, &job.location)?;

        if cancel.is_cancelled() {
            return Err(DedupError::Cancelled);
        }

        let registration = self.store.register(&identity, &job.id, Utc::now()).await?;
        let metadata = registration.metadata;

        if registration.already_linked {
            debug!(canonical_id = %metadata.canonical_job_id, "Job already ingested");
        } else if registration.is_new_canonical {
            info!(identity = %identity, "New canonical job");
        } else {
            info!(
                canonical_id = %metadata.canonical_job_id,
                duplicate_count = metadata.duplicate_count,
                "Duplicate job linked to canonical record"
            );
        }

        Ok(IngestOutcome {
            canonical_id: metadata.canonical_job_id,
            is_new_canonical: registration.is_new_canonical,
            duplicate_count: metadata.duplicate_count,
            identity,
            already_linked: registration.already_linked,
        })
    }

    pub async fn metadata(
        &self,
        identity: &IdentityHash,
    ) -> DedupResult<Option<CanonicalJobMetadata>> {
        self.store.metadata(identity).await
    }

    pub async fn canonical_for_job(&self, job_id: &str) -> DedupResult<Option<String>> {
        self.store.canonical_for_job(job_id).await
    }
}

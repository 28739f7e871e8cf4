use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::constants::validate_embedding_dim;
use crate::hashing::point_id_for_job;
use crate::scoring::cosine_similarity;

use super::{
    JobVectorPoint, VectorDbError, VectorDbResult, VectorIndex, VectorMatch, WriteConsistency,
};

const MOCK_COLLECTION: &str = "mock";

#[derive(Clone)]
struct MockStoredPoint {
    job_id: String,
    user_id: String,
    vector: Vec<f32>,
}

/// In-memory [`VectorIndex`] with brute-force cosine search.
///
/// `set_leak_other_tenants(true)` makes it ignore the user filter, the way a misconfigured
/// index would.
pub struct MockVectorIndex {
    vector_size: u64,
    created: AtomicBool,
    points: RwLock<HashMap<u64, MockStoredPoint>>,
    fail_searches: AtomicBool,
    fail_upserts: AtomicBool,
    leak_other_tenants: AtomicBool,
    search_calls: AtomicUsize,
}

impl Default for MockVectorIndex {
    fn default() -> Self {
        Self::new(crate::constants::EMBEDDING_DIM_U64)
    }
}

impl MockVectorIndex {
    pub fn new(vector_size: u64) -> Self {
        Self {
            vector_size,
            created: AtomicBool::new(true),
            points: RwLock::new(HashMap::new()),
            fail_searches: AtomicBool::new(false),
            fail_upserts: AtomicBool::new(false),
            leak_other_tenants: AtomicBool::new(false),
            search_calls: AtomicUsize::new(0),
        }
    }

    /// Starts without a collection; operations fail until `ensure_collection` runs.
    pub fn without_collection(vector_size: u64) -> Self {
        let index = Self::new(vector_size);
        index.created.store(false, Ordering::SeqCst);
        index
    }

    pub fn set_fail_searches(&self, fail: bool) {
        self.fail_searches.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    pub fn set_leak_other_tenants(&self, leak: bool) {
        self.leak_other_tenants.store(leak, Ordering::SeqCst);
    }

    pub fn point_count(&self) -> usize {
        self.points.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.points
            .read()
            .map(|p| p.contains_key(&point_id_for_job(job_id)))
            .unwrap_or(false)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn check_created(&self) -> VectorDbResult<()> {
        if !self.created.load(Ordering::SeqCst) {
            return Err(VectorDbError::CollectionNotFound {
                collection: MOCK_COLLECTION.to_string(),
            });
        }
        Ok(())
    }
}

impl VectorIndex for MockVectorIndex {
    async fn ensure_collection(&self) -> VectorDbResult<()> {
        self.created.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert(
        &self,
        points: Vec<JobVectorPoint>,
        _consistency: WriteConsistency,
    ) -> VectorDbResult<()> {
        self.check_created()?;
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(VectorDbError::UpsertFailed {
                collection: MOCK_COLLECTION.to_string(),
                message: "injected failure".to_string(),
            });
        }

        let mut stored = self.points.write().map_err(|_| VectorDbError::UpsertFailed {
            collection: MOCK_COLLECTION.to_string(),
            message: "lock poisoned".to_string(),
        })?;

        for point in points {
            validate_embedding_dim(point.vector.len(), self.vector_size as usize)?;
            stored.insert(
                point.point_id(),
                MockStoredPoint {
                    job_id: point.job_id,
                    user_id: point.user_id,
                    vector: point.vector,
                },
            );
        }

        Ok(())
    }

    async fn search(
        &self,
        query: Vec<f32>,
        limit: u64,
        user_id: Option<&str>,
    ) -> VectorDbResult<Vec<VectorMatch>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.check_created()?;
        if self.fail_searches.load(Ordering::SeqCst) {
            return Err(VectorDbError::SearchFailed {
                collection: MOCK_COLLECTION.to_string(),
                message: "injected failure".to_string(),
            });
        }
        validate_embedding_dim(query.len(), self.vector_size as usize)?;

        let stored = self.points.read().map_err(|_| VectorDbError::SearchFailed {
            collection: MOCK_COLLECTION.to_string(),
            message: "lock poisoned".to_string(),
        })?;

        let leak = self.leak_other_tenants.load(Ordering::SeqCst);
        let mut results: Vec<VectorMatch> = stored
            .values()
            .filter(|p| leak || user_id.is_none_or(|u| u == p.user_id))
            .filter_map(|p| {
                let score = cosine_similarity(&query, &p.vector).ok()?;
                Some(VectorMatch {
                    job_id: p.job_id.clone(),
                    user_id: p.user_id.clone(),
                    score: score as f32,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });
        results.truncate(limit as usize);
        Ok(results)
    }

    async fn delete(&self, job_ids: &[String]) -> VectorDbResult<()> {
        self.check_created()?;
        let mut stored = self.points.write().map_err(|_| VectorDbError::DeleteFailed {
            collection: MOCK_COLLECTION.to_string(),
            message: "lock poisoned".to_string(),
        })?;

        for job_id in job_ids {
            stored.remove(&point_id_for_job(job_id));
        }
        Ok(())
    }
}

use std::collections::HashMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{PointStruct, ScoredPoint, Value};

use crate::embedding::EmbeddingVector;
use crate::hashing::point_id_for_job;

pub(crate) const PAYLOAD_JOB_ID: &str = "job_id";
pub(crate) const PAYLOAD_USER_ID: &str = "user_id";
pub(crate) const PAYLOAD_INDEXED_AT: &str = "indexed_at";

/// One canonical job embedding, ready for upsert.
#[derive(Debug, Clone)]
pub struct JobVectorPoint {
    pub job_id: String,
    pub user_id: String,
    pub vector: Vec<f32>,
    /// Unix milliseconds.
    pub indexed_at: i64,
}

impl JobVectorPoint {
    pub fn new(job_id: impl Into<String>, user_id: impl Into<String>, vector: &EmbeddingVector) -> Self {
        Self {
            job_id: job_id.into(),
            user_id: user_id.into(),
            vector: vector.as_slice().to_vec(),
            indexed_at: 0,
        }
    }

    pub fn with_indexed_at(mut self, indexed_at: i64) -> Self {
        self.indexed_at = indexed_at;
        self
    }

    /// Qdrant point id; derived from the job id so re-indexing overwrites.
    pub fn point_id(&self) -> u64 {
        point_id_for_job(&self.job_id)
    }

    pub(crate) fn into_point_struct(self) -> PointStruct {
        let id = self.point_id();
        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert(PAYLOAD_JOB_ID.to_string(), self.job_id.into());
        payload.insert(PAYLOAD_USER_ID.to_string(), self.user_id.into());
        payload.insert(PAYLOAD_INDEXED_AT.to_string(), self.indexed_at.into());

        PointStruct::new(id, self.vector, payload)
    }
}

/// A nearest-neighbour hit with the tenancy metadata stored alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub job_id: String,
    pub user_id: String,
    /// Cosine similarity reported by the index.
    pub score: f32,
}

impl VectorMatch {
    /// Converts a Qdrant hit. Points without a numeric id or a `job_id` payload are skipped.
    pub fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        match point.id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Num(_)) => {}
            _ => return None,
        }

        let payload = point.payload;

        let job_id = payload
            .get(PAYLOAD_JOB_ID)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())?;

        let user_id = payload
            .get(PAYLOAD_USER_ID)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_default();

        Some(VectorMatch {
            job_id,
            user_id,
            score: point.score,
        })
    }
}

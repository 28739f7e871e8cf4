use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder,
    DeletePointsBuilder, Distance, FieldType, Filter, PointStruct, PointsIdsList,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use tracing::{debug, instrument};

use crate::constants::validate_embedding_dim;
use crate::hashing::point_id_for_job;

use super::WriteConsistency;
use super::error::{VectorDbError, VectorDbResult};
use super::model::{JobVectorPoint, PAYLOAD_USER_ID, VectorMatch};

/// Async interface over the vector index used by ingestion and hybrid search.
pub trait VectorIndex: Send + Sync + 'static {
    /// Ensures the collection exists.
    fn ensure_collection(&self) -> impl std::future::Future<Output = VectorDbResult<()>> + Send;

    /// Upserts points; a point with an existing job id is overwritten.
    fn upsert(
        &self,
        points: Vec<JobVectorPoint>,
        consistency: WriteConsistency,
    ) -> impl std::future::Future<Output = VectorDbResult<()>> + Send;

    /// Nearest neighbours of `query`, best first, restricted to `user_id` when given.
    fn search(
        &self,
        query: Vec<f32>,
        limit: u64,
        user_id: Option<&str>,
    ) -> impl std::future::Future<Output = VectorDbResult<Vec<VectorMatch>>> + Send;

    /// Deletes points by job id.
    fn delete(
        &self,
        job_ids: &[String],
    ) -> impl std::future::Future<Output = VectorDbResult<()>> + Send;
}

#[derive(Clone)]
/// [`VectorIndex`] backed by one Qdrant collection with cosine distance.
pub struct QdrantVectorIndex {
    client: Qdrant,
    url: String,
    collection: String,
    vector_size: u64,
}

impl std::fmt::Debug for QdrantVectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantVectorIndex")
            .field("url", &self.url)
            .field("collection", &self.collection)
            .field("vector_size", &self.vector_size)
            .finish_non_exhaustive()
    }
}

impl QdrantVectorIndex {
    /// Creates a client for `url`. No request is made until the first operation.
    pub fn new(url: &str, collection: &str, vector_size: u64) -> VectorDbResult<Self> {
        let client =
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        Ok(Self {
            client,
            url: url.to_string(),
            collection: collection.to_string(),
            vector_size,
        })
    }

    pub fn client(&self) -> &Qdrant {
        &self.client
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> VectorDbResult<()> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn create_collection(&self) -> VectorDbResult<()> {
        let create_failed = |e: qdrant_client::QdrantError| VectorDbError::CreateCollectionFailed {
            collection: self.collection.clone(),
            message: e.to_string(),
        };

        let vectors_config = VectorParamsBuilder::new(self.vector_size, Distance::Cosine);
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(vectors_config)
                    .on_disk_payload(true),
            )
            .await
            .map_err(create_failed)?;

        self.client
            .create_field_index(
                CreateFieldIndexCollectionBuilder::new(
                    &self.collection,
                    PAYLOAD_USER_ID,
                    FieldType::Keyword,
                )
                .wait(true),
            )
            .await
            .map_err(create_failed)?;

        Ok(())
    }

    fn check_dimension(&self, vector: &[f32]) -> VectorDbResult<()> {
        validate_embedding_dim(vector.len(), self.vector_size as usize)?;
        Ok(())
    }
}

impl VectorIndex for QdrantVectorIndex {
    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn ensure_collection(&self) -> VectorDbResult<()> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| VectorDbError::CreateCollectionFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        if !exists {
            debug!("Creating collection");
            self.create_collection().await?;
        }

        Ok(())
    }

    #[instrument(skip(self, points), fields(collection = %self.collection, points = points.len()))]
    async fn upsert(
        &self,
        points: Vec<JobVectorPoint>,
        consistency: WriteConsistency,
    ) -> VectorDbResult<()> {
        if points.is_empty() {
            return Ok(());
        }
        for point in &points {
            self.check_dimension(&point.vector)?;
        }

        let qdrant_points: Vec<PointStruct> = points
            .into_iter()
            .map(JobVectorPoint::into_point_struct)
            .collect();

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(&self.collection, qdrant_points)
                    .wait(consistency.into()),
            )
            .await
            .map_err(|e| VectorDbError::UpsertFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    #[instrument(skip(self, query), fields(collection = %self.collection))]
    async fn search(
        &self,
        query: Vec<f32>,
        limit: u64,
        user_id: Option<&str>,
    ) -> VectorDbResult<Vec<VectorMatch>> {
        self.check_dimension(&query)?;

        let mut search_builder =
            SearchPointsBuilder::new(&self.collection, query, limit).with_payload(true);

        if let Some(user_id) = user_id {
            let filter = Filter::must([Condition::matches(PAYLOAD_USER_ID, user_id.to_string())]);
            search_builder = search_builder.filter(filter);
        }

        let search_result = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| VectorDbError::SearchFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        let results: Vec<VectorMatch> = search_result
            .result
            .into_iter()
            .filter_map(VectorMatch::from_scored_point)
            .collect();

        debug!(hits = results.len(), "Vector search complete");
        Ok(results)
    }

    async fn delete(&self, job_ids: &[String]) -> VectorDbResult<()> {
        if job_ids.is_empty() {
            return Ok(());
        }

        let points_selector = PointsIdsList {
            ids: job_ids
                .iter()
                .map(|id| point_id_for_job(id).into())
                .collect(),
        };

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(points_selector)
                    .wait(true),
            )
            .await
            .map_err(|e| VectorDbError::DeleteFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}

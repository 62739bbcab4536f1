//! The Qdrant adapter.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, QueryPointsBuilder, ScoredPoint,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{debug, info};

use trace_graph_core::config::QdrantConfig;
use trace_graph_core::error::{IndexError, Result};
use trace_graph_core::traits::VectorIndex;
use trace_graph_core::types::{PointKey, VectorEntry, VectorHit};

/// Vector index over one Qdrant collection.
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
    /// Dimension recorded by `ensure_collection`; 0 until known. Entries
    /// are validated against it so a mismatch fails here instead of being
    /// silently dropped by the backend.
    dimension: AtomicUsize,
}

impl QdrantVectorIndex {
    /// Connect to the configured Qdrant instance. No collection is touched
    /// until the first `ensure_collection`.
    pub fn connect(config: &QdrantConfig) -> Result<Self> {
        let client = Qdrant::from_url(&config.url)
            .build()
            .map_err(|e| IndexError::Backend(e.to_string()))?;
        Ok(Self {
            client,
            collection: config.collection.clone(),
            dimension: AtomicUsize::new(0),
        })
    }

    fn payload_json(entry: &VectorEntry) -> serde_json::Value {
        serde_json::json!({
            "type": entry.key.kind.label(),
            "business_id": entry.key.id,
            "text": entry.text,
        })
    }

    fn payload_for(entry: &VectorEntry) -> Result<Payload> {
        Payload::try_from(Self::payload_json(entry))
            .map_err(|e| IndexError::Backend(format!("payload encoding failed: {e}")).into())
    }

    fn hit_from(point: &ScoredPoint) -> Result<VectorHit> {
        let get_str = |key: &str| -> Option<String> {
            point.payload.get(key).and_then(|v| v.as_str().map(ToString::to_string))
        };
        let label = get_str("type")
            .ok_or_else(|| IndexError::MalformedHit("payload missing type".into()))?;
        let business_id = get_str("business_id")
            .ok_or_else(|| IndexError::MalformedHit("payload missing business_id".into()))?;
        let key = PointKey::parse(&format!("{label}:{business_id}")).ok_or_else(|| {
            IndexError::MalformedHit(format!("unknown artifact type {label:?}"))
        })?;
        Ok(VectorHit { key, score: point.score, text: get_str("text").unwrap_or_default() })
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| IndexError::Backend(e.to_string()))?;

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| IndexError::Backend(e.to_string()))?;
            info!(collection = %self.collection, dimension, "created vector collection");
        } else {
            debug!(collection = %self.collection, "vector collection already exists");
        }

        self.dimension.store(dimension, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert(&self, entries: Vec<VectorEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let expected = self.dimension.load(Ordering::SeqCst);
        if expected == 0 {
            return Err(IndexError::Backend(
                "collection not initialized; call ensure_collection first".into(),
            )
            .into());
        }

        let mut points = Vec::with_capacity(entries.len());
        for entry in &entries {
            if entry.vector.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: entry.vector.len(),
                }
                .into());
            }
            points.push(PointStruct::new(
                entry.key.point_uuid().to_string(),
                entry.vector.clone(),
                Self::payload_for(entry)?,
            ));
        }

        let count = points.len();
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| IndexError::Backend(e.to_string()))?;
        debug!(collection = %self.collection, count, "upserted vector entries");
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<VectorHit>> {
        let response = self
            .client
            .query(
                QueryPointsBuilder::new(&self.collection)
                    .query(vector.to_vec())
                    .limit(limit as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| IndexError::Backend(e.to_string()))?;

        response.result.iter().map(Self::hit_from).collect()
    }
}

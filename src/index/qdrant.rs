//! Qdrant-backed index service.
//!
//! Each agent is one point with four named vectors: dense embeddings of
//! the description and tag text (from the embedding provider) and sparse
//! lexical embeddings of the same fields (fastembed SPLADE model, scored
//! by Qdrant's sparse index). Name, address, description and tags ride
//! along as payload so ranked results carry their stored fields.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fastembed::{SparseInitOptions, SparseTextEmbedding};
use futures::future::try_join_all;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance,
    Filter, NamedVectors, PointStruct, Query, QueryPointsBuilder, ScoredPoint,
    SparseVectorParamsBuilder, SparseVectorsConfigBuilder, UpsertPointsBuilder, Value, Vector,
    VectorInput, VectorParamsBuilder, VectorsConfigBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tokio::task;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::search::EmbeddingProvider;

use super::{IndexEntry, IndexService, QueryTarget, Ranked, Signal, SubQuery};

const DENSE_DESCRIPTION: &str = "description_dense";
const DENSE_TAGS: &str = "tags_dense";
const SPARSE_DESCRIPTION: &str = "description_sparse";
const SPARSE_TAGS: &str = "tags_sparse";

/// Index service over a Qdrant collection.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    embedder: Arc<dyn EmbeddingProvider>,
    // fastembed sessions are not Sync; serialized behind a mutex and only
    // ever driven from spawn_blocking.
    sparse: Arc<Mutex<SparseTextEmbedding>>,
}

impl QdrantIndex {
    /// Connect to Qdrant and load the sparse lexical model.
    pub async fn connect(
        config: &IndexConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let client = Qdrant::from_url(&config.url)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Index(e.to_string()))?;

        let sparse = task::spawn_blocking(|| {
            SparseTextEmbedding::try_new(SparseInitOptions::default())
        })
        .await
        .map_err(|e| Error::Index(e.to_string()))?
        .map_err(|e| Error::Index(e.to_string()))?;

        info!(collection = %config.collection, url = %config.url, "connected to qdrant index");

        Ok(Self {
            client,
            collection: config.collection.clone(),
            embedder,
            sparse: Arc::new(Mutex::new(sparse)),
        })
    }

    /// Create the agent collection if it does not exist yet.
    pub async fn ensure_collection(&self) -> Result<()> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| Error::Index(e.to_string()))?;
        if exists {
            return Ok(());
        }

        let dim = self.embedder.dimension() as u64;
        let mut dense = VectorsConfigBuilder::default();
        dense.add_named_vector_params(
            DENSE_DESCRIPTION,
            VectorParamsBuilder::new(dim, Distance::Cosine),
        );
        dense.add_named_vector_params(DENSE_TAGS, VectorParamsBuilder::new(dim, Distance::Cosine));

        let mut sparse = SparseVectorsConfigBuilder::default();
        sparse.add_named_vector_params(SPARSE_DESCRIPTION, SparseVectorParamsBuilder::default());
        sparse.add_named_vector_params(SPARSE_TAGS, SparseVectorParamsBuilder::default());

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(dense)
                    .sparse_vectors_config(sparse),
            )
            .await
            .map_err(|e| Error::Index(e.to_string()))?;

        info!(collection = %self.collection, "created qdrant collection");
        Ok(())
    }

    /// Compute sparse lexical embeddings for a batch of texts.
    async fn sparse_embed(&self, texts: Vec<String>) -> Result<Vec<(Vec<u32>, Vec<f32>)>> {
        let model = self.sparse.clone();
        task::spawn_blocking(move || {
            let model = model.lock().expect("sparse model lock poisoned");
            let embedded = model
                .embed(texts, None)
                .map_err(|e| Error::Index(e.to_string()))?;
            Ok(embedded
                .into_iter()
                .map(|e| {
                    let indices = e.indices.into_iter().map(|i| i as u32).collect();
                    (indices, e.values)
                })
                .collect())
        })
        .await
        .map_err(|e| Error::Index(e.to_string()))?
    }

    fn dense_field(target: QueryTarget) -> &'static str {
        match target {
            QueryTarget::Description => DENSE_DESCRIPTION,
            QueryTarget::Tags => DENSE_TAGS,
        }
    }

    fn sparse_field(target: QueryTarget) -> &'static str {
        match target {
            QueryTarget::Description => SPARSE_DESCRIPTION,
            QueryTarget::Tags => SPARSE_TAGS,
        }
    }

    async fn run_sub_query(&self, sub: &SubQuery, limit: usize) -> Result<Vec<Ranked>> {
        let (field, input) = match &sub.signal {
            Signal::Vector(vector) => (
                Self::dense_field(sub.target),
                VectorInput::new_dense(vector.clone()),
            ),
            Signal::Lexical(text) => {
                let mut embedded = self.sparse_embed(vec![text.clone()]).await?;
                let (indices, values) = embedded.pop().unwrap_or_default();
                (
                    Self::sparse_field(sub.target),
                    VectorInput::new_sparse(indices, values),
                )
            }
        };

        let response = self
            .client
            .query(
                QueryPointsBuilder::new(&self.collection)
                    .query(Query::new_nearest(input))
                    .using(field)
                    .limit(limit as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| Error::Index(e.to_string()))?;

        debug!(field, results = response.result.len(), "sub-query complete");

        Ok(response
            .result
            .into_iter()
            .enumerate()
            .map(|(i, point)| Ranked {
                entry: entry_from_point(point),
                rank: i + 1,
            })
            .collect())
    }
}

#[async_trait]
impl IndexService for QdrantIndex {
    async fn query(&self, subs: &[SubQuery], limit: usize) -> Result<Vec<Vec<Ranked>>> {
        // Fan out all sub-queries concurrently; any failure fails the
        // whole call (no partial-signal fallback).
        try_join_all(subs.iter().map(|sub| self.run_sub_query(sub, limit))).await
    }

    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let descriptions: Vec<String> = entries.iter().map(|e| e.description.clone()).collect();
        let tags: Vec<String> = entries.iter().map(|e| e.tags.clone()).collect();

        let dense_desc = self
            .embedder
            .embed(&descriptions)
            .await
            .map_err(|e| Error::Index(e.to_string()))?;
        let dense_tags = self
            .embedder
            .embed(&tags)
            .await
            .map_err(|e| Error::Index(e.to_string()))?;
        let sparse_desc = self.sparse_embed(descriptions).await?;
        let sparse_tags = self.sparse_embed(tags).await?;

        let mut points = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let (sd_idx, sd_val) = sparse_desc[i].clone();
            let (st_idx, st_val) = sparse_tags[i].clone();
            let vectors = NamedVectors::default()
                .add_vector(DENSE_DESCRIPTION, Vector::new_dense(dense_desc[i].clone()))
                .add_vector(DENSE_TAGS, Vector::new_dense(dense_tags[i].clone()))
                .add_vector(SPARSE_DESCRIPTION, Vector::new_sparse(sd_idx, sd_val))
                .add_vector(SPARSE_TAGS, Vector::new_sparse(st_idx, st_val));

            let payload = Payload::try_from(serde_json::json!({
                "name": entry.name,
                "address": entry.address,
                "description": entry.description,
                "tags": entry.tags,
            }))
            .map_err(|e| Error::Index(e.to_string()))?;

            points.push(PointStruct::new(entry.id.to_string(), vectors, payload));
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .map_err(|e| Error::Index(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, address: &str) -> Result<()> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(Filter::must([Condition::matches(
                        "address",
                        address.to_string(),
                    )]))
                    .wait(true),
            )
            .await
            .map_err(|e| Error::Index(e.to_string()))?;
        Ok(())
    }
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> String {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .map(String::to_string)
        .unwrap_or_default()
}

fn entry_from_point(point: ScoredPoint) -> IndexEntry {
    let id = point
        .id
        .and_then(|id| id.point_id_options)
        .and_then(|opts| match opts {
            PointIdOptions::Uuid(s) => Uuid::parse_str(&s).ok(),
            PointIdOptions::Num(n) => Some(Uuid::from_u128(n as u128)),
        })
        .unwrap_or_default();

    IndexEntry {
        id,
        name: payload_str(&point.payload, "name"),
        address: payload_str(&point.payload, "address"),
        description: payload_str(&point.payload, "description"),
        tags: payload_str(&point.payload, "tags"),
    }
}

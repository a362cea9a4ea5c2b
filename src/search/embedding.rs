//! Embedding provider.
//!
//! Dense text embeddings via FastEmbed (ONNX-based, lightweight), with a
//! moka cache in front so repeated keyword sets and descriptions are only
//! embedded once. Model inference is blocking and runs on the tokio
//! blocking pool.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use moka::future::Cache;
use tokio::task;
use tracing::debug;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Default embedding model (all-MiniLM-L6-v2 - 384 dimensions, good balance of speed/quality)
pub const DEFAULT_MODEL: EmbeddingModel = EmbeddingModel::AllMiniLML6V2;

/// Embedding dimension for the default model
pub const EMBEDDING_DIM: usize = 384;

/// Abstract embedding contract: fixed output dimensionality per deployment.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Output vector dimensionality.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// FastEmbed-backed embedding provider with an in-memory cache.
pub struct FastEmbedder {
    // fastembed sessions are not Sync; serialized behind a mutex and only
    // ever driven from spawn_blocking.
    model: Arc<Mutex<TextEmbedding>>,
    cache: Cache<String, Vec<f32>>,
}

impl FastEmbedder {
    /// Load the default model (downloads ~90MB on first use).
    pub async fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = task::spawn_blocking(|| {
            TextEmbedding::try_new(InitOptions::new(DEFAULT_MODEL))
        })
        .await
        .map_err(|e| Error::Embedding(e.to_string()))?
        .map_err(|e| Error::Embedding(e.to_string()))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            cache: Cache::new(config.cache_capacity),
        })
    }

    async fn embed_uncached(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = self.model.clone();
        task::spawn_blocking(move || {
            let model = model.lock().expect("embedding model lock poisoned");
            model
                .embed(texts, None)
                .map_err(|e| Error::Embedding(e.to_string()))
        })
        .await
        .map_err(|e| Error::Embedding(e.to_string()))?
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedder {
    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut misses: Vec<(usize, String)> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache.get(text).await {
                Some(v) => vectors.push(Some(v)),
                None => {
                    vectors.push(None);
                    misses.push((i, text.clone()));
                }
            }
        }

        let embedded = if misses.is_empty() {
            Vec::new()
        } else {
            debug!(misses = misses.len(), total = texts.len(), "embedding cache misses");
            let texts_to_embed: Vec<String> = misses.iter().map(|(_, t)| t.clone()).collect();
            self.embed_uncached(texts_to_embed).await?
        };

        for ((_, text), vector) in misses.iter().zip(&embedded) {
            self.cache.insert(text.clone(), vector.clone()).await;
        }

        let miss_slots: Vec<usize> = misses.into_iter().map(|(i, _)| i).collect();
        Ok(fill_missing(vectors, miss_slots, embedded))
    }
}

/// Merge freshly embedded vectors back into their miss slots.
///
/// Every slot must end up filled by either the cache pass or the miss
/// pass; a hole means the two passes disagree and is a logic error, so
/// it panics rather than degrading into a zero-signal query.
fn fill_missing(
    mut vectors: Vec<Option<Vec<f32>>>,
    miss_slots: Vec<usize>,
    embedded: Vec<Vec<f32>>,
) -> Vec<Vec<f32>> {
    for (i, vector) in miss_slots.into_iter().zip(embedded) {
        vectors[i] = Some(vector);
    }
    vectors
        .into_iter()
        .map(|v| v.expect("slot filled by cache or miss pass"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_missing_interleaves_hits_and_misses() {
        // Slots 0 and 2 were cache hits; slot 1 comes from the miss pass.
        let vectors = vec![Some(vec![1.0]), None, Some(vec![3.0])];
        let filled = fill_missing(vectors, vec![1], vec![vec![2.0]]);
        assert_eq!(filled, vec![vec![1.0], vec![2.0], vec![3.0]]);
    }

    #[test]
    fn test_fill_missing_all_hits_needs_no_embeddings() {
        let vectors = vec![Some(vec![1.0]), Some(vec![2.0])];
        let filled = fill_missing(vectors, Vec::new(), Vec::new());
        assert_eq!(filled.len(), 2);
    }

    #[test]
    #[should_panic(expected = "slot filled by cache or miss pass")]
    fn test_fill_missing_panics_on_unfilled_slot() {
        // A miss slot without a matching embedding must be loud, not a
        // silent empty vector.
        fill_missing(vec![None], vec![0], Vec::new());
    }
}

//! Retrieval index: denormalized agent projections and ranked sub-queries.
//!
//! The index is an external engine (Qdrant in production) that owns the
//! ANN structures and BM25 scoring. It is written by registration flows
//! and read by the search pipeline, with no transactional coupling to the
//! record store: an entry here may lag or outlive its canonical record,
//! and reconciliation handles that.

mod qdrant;

pub use qdrant::QdrantIndex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::records::Agent;

/// Denormalized projection of an [`Agent`] held by the index.
///
/// Internal retrieval artifact; never returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Surrogate id of the index point.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Full agent address; join key back to the record store.
    pub address: String,
    /// Description text.
    pub description: String,
    /// Capability tags flattened to one text field.
    pub tags: String,
}

impl IndexEntry {
    /// Project a canonical agent record into its index entry.
    pub fn from_agent(agent: &Agent) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: agent.name.clone(),
            address: agent.address.clone(),
            description: agent.description.clone(),
            tags: agent.capabilities.join(" "),
        }
    }
}

/// Which stored field a sub-query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTarget {
    /// Description text / embedding.
    Description,
    /// Tag text / embedding.
    Tags,
}

/// Retrieval signal carried by a sub-query.
#[derive(Debug, Clone)]
pub enum Signal {
    /// Lexical (BM25) match of the given text.
    Lexical(String),
    /// Similarity to the given embedding.
    Vector(Vec<f32>),
}

/// One sub-query of a multi-signal retrieval call.
#[derive(Debug, Clone)]
pub struct SubQuery {
    /// Field the sub-query targets.
    pub target: QueryTarget,
    /// Signal to match against that field.
    pub signal: Signal,
}

/// An index entry with its 1-based rank within one sub-query result list.
#[derive(Debug, Clone)]
pub struct Ranked {
    pub entry: IndexEntry,
    pub rank: usize,
}

/// Abstract index service contract.
///
/// `query` is atomic: either every sub-query produced a ranked list or
/// the whole call fails. There is no partial-signal fallback.
#[async_trait]
pub trait IndexService: Send + Sync {
    /// Run all sub-queries, each bounded to `limit` results, returning one
    /// ranked list per sub-query in input order (rank 1 = best).
    async fn query(&self, subs: &[SubQuery], limit: usize) -> Result<Vec<Vec<Ranked>>>;

    /// Insert or replace index entries.
    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<()>;

    /// Delete all entries for the given agent address.
    async fn delete(&self, address: &str) -> Result<()>;
}

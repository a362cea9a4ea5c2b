//! AgentDNS node library.
//!
//! A naming and discovery service for AI agents: resolves hierarchical
//! `agentdns://organization[/name]` addresses to canonical records and
//! answers free-text queries through a hybrid retrieval pipeline (keyword
//! extraction, lexical + vector sub-queries, reciprocal rank fusion, LLM
//! relevance filtering, reconciliation against the record store).

pub mod address;
pub mod completion;
pub mod config;
pub mod error;
pub mod index;
pub mod records;
pub mod resolver;
pub mod search;
pub mod store;

pub use address::{normalize, AgentAddress};
pub use completion::{ChatClient, TextGeneration};
pub use config::NodeConfig;
pub use error::{Error, Result};
pub use index::{IndexEntry, IndexService, QdrantIndex};
pub use records::{Agent, AgentInterface, Cost, Organization};
pub use resolver::Resolver;
pub use search::{
    EmbeddingProvider, FastEmbedder, SearchOptions, SearchPipeline,
};
pub use store::{MemoryStore, RecordStore, RocksStore};

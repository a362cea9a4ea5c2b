//! Hybrid discovery search for agent records.
//!
//! Turns a free-text query into a small, high-precision ranked result set:
//! - FastEmbed for embedding generation (ONNX-based, lightweight)
//! - keyword extraction and relevance filtering via a text-generation service
//! - multi-signal retrieval (lexical + vector) against the external index
//! - Reciprocal Rank Fusion over the per-signal ranked lists
//! - reconciliation against the authoritative record store
//!
//! # Architecture
//!
//! ```text
//! free-text query
//!       │
//!       ▼
//! ┌─────────────────┐     keywords      ┌──────────────────────────┐
//! │ Query           │──────────────────▶│ Multi-Signal Retrieval   │
//! │ Understanding   │                   │ lexical ×2 + vector ×1   │
//! └─────────────────┘                   └───────────┬──────────────┘
//!                                                   │ 3 ranked lists
//!                                                   ▼
//!                                        ┌──────────────────┐
//!                                        │   Rank Fusion    │
//!                                        │  Σ 1/(c + rank)  │
//!                                        └────────┬─────────┘
//!                                                 ▼
//!                                        ┌──────────────────┐
//!                                        │ Relevance Filter │
//!                                        └────────┬─────────┘
//!                                                 ▼
//!                                        ┌──────────────────┐
//!                                        │  Reconciliation  │──▶ canonical records
//!                                        └──────────────────┘
//! ```

mod embedding;
pub mod filter;
pub mod fusion;
pub mod keywords;
mod pipeline;

pub use embedding::{EmbeddingProvider, FastEmbedder, DEFAULT_MODEL, EMBEDDING_DIM};
pub use pipeline::{SearchOptions, SearchPipeline};

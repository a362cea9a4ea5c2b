//! Crate-wide error type and result alias.
//!
//! The taxonomy mirrors how failures propagate through the discovery
//! pipeline: malformed addresses and unavailable retrieval stages surface
//! to the caller, while consistency gaps between the index and the record
//! store and unparseable filter responses are absorbed locally (logged,
//! result degrades) and never appear here.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// AgentDNS node error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Address does not match `agentdns://organization[/name]`.
    #[error("malformed address '{0}': expected agentdns://organization[/name]")]
    MalformedAddress(String),

    /// A required external call failed; the whole search fails and the
    /// caller may retry it.
    #[error("retrieval unavailable at {stage}: {reason}")]
    RetrievalUnavailable { stage: &'static str, reason: String },

    /// Record store backend failure.
    #[error("record store error: {0}")]
    Store(String),

    /// Index service backend failure.
    #[error("index service error: {0}")]
    Index(String),

    /// Embedding provider failure.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Text-generation provider failure.
    #[error("completion error: {0}")]
    Completion(String),

    /// Configuration load/save failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a collaborator failure as a search-level retrieval failure.
    pub fn retrieval(stage: &'static str, err: impl std::fmt::Display) -> Self {
        Error::RetrievalUnavailable {
            stage,
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Store(format!("record serialization: {}", err))
    }
}

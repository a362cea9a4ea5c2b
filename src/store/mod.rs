//! Record store: authoritative storage for organization and agent records.
//!
//! The store is keyed by full address and independently owned from the
//! retrieval index; the discovery pipeline treats it as the source of
//! truth when reconciling index candidates (an index hit with no record
//! here is dropped, never invented).

mod memory;
mod rocks;

pub use memory::MemoryStore;
pub use rocks::RocksStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::records::{Agent, Organization};

/// Abstract record store contract.
///
/// All lookups are exact-match on the full address; `list_agents` takes
/// the bare organization token. Absence is `Ok(None)` / an empty vec,
/// never an error.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch an agent by full address.
    async fn get_agent(&self, address: &str) -> Result<Option<Agent>>;

    /// Fetch an organization by full address.
    async fn get_organization(&self, address: &str) -> Result<Option<Organization>>;

    /// List all agents whose organization token equals `organization`.
    /// Unknown organizations yield an empty list.
    async fn list_agents(&self, organization: &str) -> Result<Vec<Agent>>;

    /// Insert or update an agent record, keyed by its address.
    async fn upsert_agent(&self, agent: Agent) -> Result<()>;

    /// Insert or update an organization record, keyed by its address.
    async fn upsert_organization(&self, organization: Organization) -> Result<()>;

    /// Delete an agent record. Returns whether a record existed.
    async fn delete_agent(&self, address: &str) -> Result<bool>;
}

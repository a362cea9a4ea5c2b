//! Address resolver: the interface exposed to the API layer.
//!
//! Resolves `agentdns://` addresses to canonical records, lists an
//! organization's agents, and runs the hybrid discovery search. Also
//! carries the registration flows that keep the record store and the
//! retrieval index fed (the two stores stay independently owned; there is
//! no transaction spanning them).

use std::sync::Arc;

use tracing::info;

use crate::address::{normalize, AgentAddress};
use crate::error::{Error, Result};
use crate::index::{IndexEntry, IndexService};
use crate::records::{Agent, Organization};
use crate::search::SearchPipeline;
use crate::store::RecordStore;

/// Top-level resolver over the record store, index and search pipeline.
pub struct Resolver {
    store: Arc<dyn RecordStore>,
    index: Arc<dyn IndexService>,
    pipeline: SearchPipeline,
}

impl Resolver {
    /// Build a resolver over the given collaborators.
    pub fn new(
        store: Arc<dyn RecordStore>,
        index: Arc<dyn IndexService>,
        pipeline: SearchPipeline,
    ) -> Self {
        Self {
            store,
            index,
            pipeline,
        }
    }

    /// Resolve an agent address to its canonical record.
    ///
    /// A well-formed address with no matching record is `Ok(None)`, not an
    /// error; a malformed address is [`Error::MalformedAddress`].
    pub async fn resolve(&self, address: &str) -> Result<Option<Agent>> {
        let address = normalize(address);
        AgentAddress::parse(&address)?;
        self.store.get_agent(&address).await
    }

    /// Resolve an organization address to its canonical record.
    pub async fn resolve_organization(&self, address: &str) -> Result<Option<Organization>> {
        let address = normalize(address);
        AgentAddress::parse(&address)?;
        self.store.get_organization(&address).await
    }

    /// List the agents belonging to an organization.
    ///
    /// An unknown organization yields an empty list, never an error.
    pub async fn list_children(
        &self,
        org_address: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Agent>> {
        let org_address = normalize(org_address);
        let parsed = AgentAddress::parse(&org_address)?;

        let mut agents = self.store.list_agents(&parsed.organization).await?;
        if let Some(limit) = limit {
            agents.truncate(limit);
        }
        Ok(agents)
    }

    /// Find agents matching a free-text query via the hybrid discovery
    /// pipeline, returning at most `limit` canonical records in descending
    /// relevance order.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Agent>> {
        self.pipeline.search(query, limit).await
    }

    /// Register (or update) an organization record.
    pub async fn register_organization(&self, mut organization: Organization) -> Result<()> {
        organization.address = normalize(&organization.address);
        let parsed = AgentAddress::parse(&organization.address)?;
        if !parsed.is_organization() {
            return Err(Error::MalformedAddress(organization.address));
        }

        info!(address = %organization.address, "registering organization");
        self.store.upsert_organization(organization).await
    }

    /// Register (or update) an agent: upserts the canonical record, then
    /// its denormalized projection into the retrieval index.
    pub async fn register_agent(&self, mut agent: Agent) -> Result<()> {
        agent.address = normalize(&agent.address);
        let parsed = AgentAddress::parse(&agent.address)?;
        let name = match parsed.name {
            Some(name) => name,
            None => return Err(Error::MalformedAddress(agent.address)),
        };
        agent.organization = parsed.organization;
        if agent.name.is_empty() {
            agent.name = name;
        }

        info!(address = %agent.address, "registering agent");
        let entry = IndexEntry::from_agent(&agent);
        self.store.upsert_agent(agent).await?;
        self.index.upsert(vec![entry]).await
    }

    /// Remove an agent from both the record store and the index.
    /// Returns whether a canonical record existed.
    pub async fn deregister_agent(&self, address: &str) -> Result<bool> {
        let address = normalize(address);
        AgentAddress::parse(&address)?;

        let existed = self.store.delete_agent(&address).await?;
        self.index.delete(&address).await?;
        info!(address = %address, existed, "deregistered agent");
        Ok(existed)
    }
}

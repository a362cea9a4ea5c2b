//! In-memory record store for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::records::{Agent, Organization};

use super::RecordStore;

/// Record store backed by in-process hash maps.
#[derive(Default)]
pub struct MemoryStore {
    agents: RwLock<HashMap<String, Agent>>,
    organizations: RwLock<HashMap<String, Organization>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_agent(&self, address: &str) -> Result<Option<Agent>> {
        Ok(self.agents.read().await.get(address).cloned())
    }

    async fn get_organization(&self, address: &str) -> Result<Option<Organization>> {
        Ok(self.organizations.read().await.get(address).cloned())
    }

    async fn list_agents(&self, organization: &str) -> Result<Vec<Agent>> {
        let agents = self.agents.read().await;
        let mut matched: Vec<Agent> = agents
            .values()
            .filter(|a| a.organization == organization)
            .cloned()
            .collect();
        // HashMap iteration order is arbitrary; keep listings stable.
        matched.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(matched)
    }

    async fn upsert_agent(&self, agent: Agent) -> Result<()> {
        self.agents
            .write()
            .await
            .insert(agent.address.clone(), agent);
        Ok(())
    }

    async fn upsert_organization(&self, organization: Organization) -> Result<()> {
        self.organizations
            .write()
            .await
            .insert(organization.address.clone(), organization);
        Ok(())
    }

    async fn delete_agent(&self, address: &str) -> Result<bool> {
        Ok(self.agents.write().await.remove(address).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_agent(org: &str, name: &str) -> Agent {
        Agent {
            address: format!("agentdns://{}/{}", org, name),
            name: name.to_string(),
            organization: org.to_string(),
            description: format!("{} agent", name),
            interfaces: Vec::new(),
            endpoint: "https://example.com".to_string(),
            cost: Default::default(),
            capabilities: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = MemoryStore::new();
        store.upsert_agent(sample_agent("acme", "bot")).await.unwrap();

        let agent = store.get_agent("agentdns://acme/bot").await.unwrap();
        assert_eq!(agent.unwrap().name, "bot");
        assert!(store.get_agent("agentdns://acme/ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_agents_filters_by_organization() {
        let store = MemoryStore::new();
        store.upsert_agent(sample_agent("acme", "a")).await.unwrap();
        store.upsert_agent(sample_agent("acme", "b")).await.unwrap();
        store.upsert_agent(sample_agent("other", "c")).await.unwrap();

        let agents = store.list_agents("acme").await.unwrap();
        assert_eq!(agents.len(), 2);
        assert!(store.list_agents("ghost-org").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_agent() {
        let store = MemoryStore::new();
        store.upsert_agent(sample_agent("acme", "bot")).await.unwrap();

        assert!(store.delete_agent("agentdns://acme/bot").await.unwrap());
        assert!(!store.delete_agent("agentdns://acme/bot").await.unwrap());
    }
}

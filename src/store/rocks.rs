//! RocksDB-backed record store.
//!
//! Layout: agents under `agent:{address}`, organizations under
//! `org:{address}`, values as JSON. Organization listing scans the
//! `agent:agentdns://{org}/` key range, so no secondary index is needed.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rocksdb::{Direction, IteratorMode, DB};
use tokio::task;

use crate::address::SCHEME;
use crate::error::{Error, Result};
use crate::records::{Agent, Organization};

use super::RecordStore;

const AGENT_PREFIX: &str = "agent:";
const ORG_PREFIX: &str = "org:";

/// Persistent record store on RocksDB.
pub struct RocksStore {
    db: Arc<DB>,
}

impl RocksStore {
    /// Open (creating if missing) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = DB::open_default(path.as_ref()).map_err(|e| Error::Store(e.to_string()))?;
        Ok(Self { db: Arc::new(db) })
    }

    async fn get_raw(&self, key: String) -> Result<Option<Vec<u8>>> {
        let db = self.db.clone();
        task::spawn_blocking(move || db.get(key.as_bytes()))
            .await
            .map_err(|e| Error::Store(e.to_string()))?
            .map_err(|e| Error::Store(e.to_string()))
    }

    async fn put_raw(&self, key: String, value: Vec<u8>) -> Result<()> {
        let db = self.db.clone();
        task::spawn_blocking(move || db.put(key.as_bytes(), value))
            .await
            .map_err(|e| Error::Store(e.to_string()))?
            .map_err(|e| Error::Store(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for RocksStore {
    async fn get_agent(&self, address: &str) -> Result<Option<Agent>> {
        match self.get_raw(format!("{}{}", AGENT_PREFIX, address)).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    async fn get_organization(&self, address: &str) -> Result<Option<Organization>> {
        match self.get_raw(format!("{}{}", ORG_PREFIX, address)).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    async fn list_agents(&self, organization: &str) -> Result<Vec<Agent>> {
        let db = self.db.clone();
        let prefix = format!("{}{}{}/", AGENT_PREFIX, SCHEME, organization);

        task::spawn_blocking(move || {
            let mut agents = Vec::new();
            let iter = db.iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward));
            for item in iter {
                let (key, value) = item.map_err(|e| Error::Store(e.to_string()))?;
                if !key.starts_with(prefix.as_bytes()) {
                    break;
                }
                agents.push(serde_json::from_slice(&value)?);
            }
            Ok(agents)
        })
        .await
        .map_err(|e| Error::Store(e.to_string()))?
    }

    async fn upsert_agent(&self, agent: Agent) -> Result<()> {
        let key = format!("{}{}", AGENT_PREFIX, agent.address);
        let value = serde_json::to_vec(&agent)?;
        self.put_raw(key, value).await
    }

    async fn upsert_organization(&self, organization: Organization) -> Result<()> {
        let key = format!("{}{}", ORG_PREFIX, organization.address);
        let value = serde_json::to_vec(&organization)?;
        self.put_raw(key, value).await
    }

    async fn delete_agent(&self, address: &str) -> Result<bool> {
        let existing = self.get_agent(address).await?.is_some();
        if existing {
            let db = self.db.clone();
            let key = format!("{}{}", AGENT_PREFIX, address);
            task::spawn_blocking(move || db.delete(key.as_bytes()))
                .await
                .map_err(|e| Error::Store(e.to_string()))?
                .map_err(|e| Error::Store(e.to_string()))?;
        }
        Ok(existing)
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
    async fn test_rocks_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();

        store.upsert_agent(sample_agent("acme", "bot")).await.unwrap();
        let agent = store.get_agent("agentdns://acme/bot").await.unwrap();
        assert_eq!(agent.unwrap().organization, "acme");
    }

    #[tokio::test]
    async fn test_rocks_list_agents_scoped_to_org() {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();

        store.upsert_agent(sample_agent("acme", "a")).await.unwrap();
        store.upsert_agent(sample_agent("acme", "b")).await.unwrap();
        // "acme2" shares the "acme" byte prefix but is a different org.
        store.upsert_agent(sample_agent("acme2", "c")).await.unwrap();

        let agents = store.list_agents("acme").await.unwrap();
        assert_eq!(agents.len(), 2);
        assert!(agents.iter().all(|a| a.organization == "acme"));
        assert!(store.list_agents("ghost-org").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rocks_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();

        store.upsert_agent(sample_agent("acme", "bot")).await.unwrap();
        assert!(store.delete_agent("agentdns://acme/bot").await.unwrap());
        assert!(store.get_agent("agentdns://acme/bot").await.unwrap().is_none());
    }
}

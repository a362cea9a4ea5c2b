//! Canonical record types held by the record store.
//!
//! These are the authoritative shapes returned to callers. The retrieval
//! index holds a denormalized projection of [`Agent`] (see
//! [`crate::index::IndexEntry`]) which never escapes the pipeline.

use serde::{Deserialize, Serialize};

/// A named interface an agent declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInterface {
    /// Interface name (e.g. "summarize").
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Free-form parameter schema.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Pricing metadata for invoking an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    /// Price per billed unit.
    pub amount: f64,
    /// ISO currency code.
    pub currency: String,
    /// Billing model (e.g. "per_request", "per_token").
    pub model: String,
}

impl Default for Cost {
    fn default() -> Self {
        Self {
            amount: 0.0,
            currency: "USD".to_string(),
            model: "per_request".to_string(),
        }
    }
}

/// Canonical agent record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Full address, e.g. `agentdns://acme/translator`. Unique key.
    pub address: String,
    /// Display name.
    pub name: String,
    /// Owning organization token (not the full address).
    pub organization: String,
    /// Functional description.
    pub description: String,
    /// Declared interfaces.
    #[serde(default)]
    pub interfaces: Vec<AgentInterface>,
    /// Invocation endpoint URL.
    pub endpoint: String,
    /// Pricing metadata.
    #[serde(default)]
    pub cost: Cost,
    /// Capability tags used for discovery.
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Canonical organization record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// Full address, e.g. `agentdns://acme`. Unique key.
    pub address: String,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_json_round_trip() {
        let agent = Agent {
            address: "agentdns://acme/translator".to_string(),
            name: "Translator".to_string(),
            organization: "acme".to_string(),
            description: "Translates documents between languages".to_string(),
            interfaces: vec![AgentInterface {
                name: "translate".to_string(),
                description: "Translate a document".to_string(),
                parameters: serde_json::json!({"target_lang": "string"}),
            }],
            endpoint: "https://api.acme.example/translate".to_string(),
            cost: Cost::default(),
            capabilities: vec!["translation".to_string()],
        };
        let json = serde_json::to_string(&agent).unwrap();
        let back: Agent = serde_json::from_str(&json).unwrap();
        assert_eq!(agent, back);
    }

    #[test]
    fn test_agent_defaults_for_optional_fields() {
        let json = r#"{
            "address": "agentdns://acme/translator",
            "name": "Translator",
            "organization": "acme",
            "description": "Translates documents",
            "endpoint": "https://api.acme.example/translate"
        }"#;
        let agent: Agent = serde_json::from_str(json).unwrap();
        assert!(agent.interfaces.is_empty());
        assert!(agent.capabilities.is_empty());
        assert_eq!(agent.cost.model, "per_request");
    }
}

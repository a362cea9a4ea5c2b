//! Node configuration.
//!
//! Loaded from a TOML file (see the `init` CLI subcommand) with
//! local-development defaults. API keys are never stored in the file,
//! only the name of the environment variable that holds them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level node configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Record store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Retrieval index settings.
    #[serde(default)]
    pub index: IndexConfig,
    /// Embedding provider settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Text-generation provider settings.
    #[serde(default)]
    pub completion: CompletionConfig,
    /// Search pipeline tuning.
    #[serde(default)]
    pub search: SearchConfig,
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the RocksDB directory.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "./data/records".to_string(),
        }
    }
}

/// Retrieval index (Qdrant) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Qdrant gRPC endpoint.
    pub url: String,
    /// Collection holding agent index entries.
    pub collection: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection: "agents".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Maximum number of cached text embeddings.
    pub cache_capacity: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 10_000,
        }
    }
}

/// Text-generation provider settings (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of the chat-completions API.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string(),
            model: "qwen-max".to_string(),
            api_key_env: "DASHSCOPE_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Search pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Reciprocal-rank-fusion smoothing coefficient.
    pub fusion_coeff: u32,
    /// Default result limit when the caller does not specify one.
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fusion_coeff: 100,
            default_limit: 5,
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let raw = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = NodeConfig::default();
        config.search.fusion_coeff = 60;
        config.save(&path).unwrap();

        let loaded = NodeConfig::load(&path).unwrap();
        assert_eq!(loaded.search.fusion_coeff, 60);
        assert_eq!(loaded.index.collection, "agents");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: NodeConfig = toml::from_str("[search]\nfusion_coeff = 42\ndefault_limit = 3\n").unwrap();
        assert_eq!(config.search.fusion_coeff, 42);
        assert_eq!(config.store.path, "./data/records");
    }
}

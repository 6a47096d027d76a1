//! Configuration for the assistant
//!
//! Every section has a default, so a config file only needs the keys it
//! changes. Values are resolved in order: defaults, TOML file, `AGIP_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable holding the path of the config file
pub const CONFIG_PATH_ENV: &str = "AGIP_CONFIG";

/// Main assistant configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Text splitting configuration
    pub chunking: ChunkingConfig,
    /// Generation model configuration
    pub llm: LlmConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Knowledge index location
    pub index: IndexConfig,
    /// Human contact channels quoted in fallback messages
    pub contact: ContactConfig,
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then apply env overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
                })?;
                tracing::info!("Loaded configuration from {}", path.display());
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `AGIP_*` overrides using the given variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("AGIP_INDEX_PATH") {
            self.index.path = PathBuf::from(path);
        }
        if let Some(model) = lookup("AGIP_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = lookup("AGIP_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(host) = lookup("AGIP_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("AGIP_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid AGIP_PORT value: {}", port),
            }
        }
    }

    /// Reject settings the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.embeddings.dimension == 0 {
            return Err(Error::Config("embeddings.dimension must be greater than 0".into()));
        }
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be greater than 0".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.default_k == 0 || self.retrieval.max_k == 0 {
            return Err(Error::Config("retrieval k values must be greater than 0".into()));
        }
        if self.retrieval.default_k > self.retrieval.max_k {
            return Err(Error::Config("retrieval.default_k cannot exceed retrieval.max_k".into()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Idle seconds after which a chat session is discarded
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            enable_cors: true,
            session_ttl_secs: 3600,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Fixed vector length; also the TF-IDF vocabulary limit
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { dimension: 768 }
    }
}

/// Text splitting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Separators tried in order, coarsest first
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 128,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
        }
    }
}

/// Generation model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Anthropic API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens in the answer
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Value sent in the `anthropic-version` header
    pub api_version: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-7-sonnet-20250219".to_string(),
            temperature: 0.1,
            max_tokens: 1000,
            timeout_secs: 120,
            api_version: "2023-06-01".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks retrieved when the caller does not choose
    pub default_k: usize,
    /// Upper bound for caller-chosen k
    pub max_k: usize,
    /// Drop chunks whose cosine similarity is below this value
    pub min_score: Option<f32>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_k: 5,
            max_k: 10,
            min_score: None,
        }
    }
}

impl RetrievalConfig {
    /// Clamp a caller-chosen k into `1..=max_k`
    pub fn clamp_k(&self, k: usize) -> usize {
        k.clamp(1, self.max_k.max(1))
    }
}

/// Knowledge index location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding the persisted index
    pub path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("knowledge_index"),
        }
    }
}

/// Contact channels offered when the assistant cannot help
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Phone line of the citizen service centre
    pub phone: String,
    /// Official website
    pub website: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            phone: "0800-999-2447".to_string(),
            website: "https://www.agip.gob.ar/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_values() {
        let config = RagConfig::default();
        assert_eq!(config.embeddings.dimension, 768);
        assert_eq!(config.chunking.chunk_size, 512);
        assert_eq!(config.chunking.chunk_overlap, 128);
        assert_eq!(config.retrieval.default_k, 5);
        assert_eq!(config.llm.max_tokens, 1000);
        assert_eq!(config.server.session_ttl_secs, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = RagConfig::from_toml_str(
            r#"
            [chunking]
            chunk_size = 256
            chunk_overlap = 32

            [index]
            path = "/var/lib/agip/index"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 256);
        assert_eq!(config.chunking.separators.len(), 4);
        assert_eq!(config.index.path, PathBuf::from("/var/lib/agip/index"));
        assert_eq!(config.llm.model, "claude-3-7-sonnet-20250219");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("AGIP_INDEX_PATH", "/tmp/idx"),
            ("AGIP_PORT", "9000"),
            ("AGIP_MODEL", "claude-sonnet-4"),
        ]
        .into_iter()
        .collect();

        let mut config = RagConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.index.path, PathBuf::from("/tmp/idx"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.model, "claude-sonnet-4");
    }

    #[test]
    fn test_invalid_port_override_is_ignored() {
        let mut config = RagConfig::default();
        config.apply_overrides(|key| (key == "AGIP_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.server.port, 8501);
    }

    #[test]
    fn test_validate_rejects_overlap_not_smaller_than_size() {
        let mut config = RagConfig::default();
        config.chunking.chunk_overlap = 512;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_clamp_k() {
        let retrieval = RetrievalConfig::default();
        assert_eq!(retrieval.clamp_k(0), 1);
        assert_eq!(retrieval.clamp_k(7), 7);
        assert_eq!(retrieval.clamp_k(50), 10);
    }
}

//! Configuration management for hrqa
//!
//! Loads the TOML configuration file, applies `HRQA_*` environment overrides,
//! validates the result and resolves the external-service credentials.

use crate::error::{HrqaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub server: ServerConfig,
    pub openai: OpenAiConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub weaviate: WeaviateConfig,
    pub chunking: ChunkingConfig,
    pub ingest: IngestConfig,
    pub retrieval: RetrievalConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory where uploaded PDFs are kept
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

/// Hosted embedding/chat provider connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    /// Expected vector length; must match the collection's vectors
    pub dimensions: usize,
}

/// Chat model configuration, one model per pipeline stage.
/// Every call runs at temperature 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub expansion_model: String,
    pub rerank_model: String,
    pub answer_model: String,
}

/// Vector store connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaviateConfig {
    pub url_env: String,
    pub api_key_env: String,
    pub collection: String,
    pub init_timeout_secs: u64,
    pub query_timeout_secs: u64,
    pub insert_timeout_secs: u64,
}

/// Sliding-window chunker settings (in characters)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

/// Ingestion batching and retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub batch_size: usize,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl IngestConfig {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

/// Query-side retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Candidates requested from hybrid search
    pub search_limit: usize,
    /// Hybrid blend weight; lower favours keyword match
    pub alpha: f32,
    /// Reranked candidates handed to answer synthesis
    pub context_size: usize,
    /// Characters of each candidate shown to the reranker
    pub rerank_preview_chars: usize,
}

/// Secrets resolved from the environment at startup
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub weaviate_url: String,
    pub weaviate_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("weaviate_url", &self.weaviate_url)
            .field("weaviate_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolve every credential named by the config from the process environment
    pub fn from_env(config: &Config) -> Result<Self> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve credentials through an arbitrary lookup
    pub fn resolve<F>(config: &Config, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |var: &str| -> Result<String> {
            match lookup(var) {
                Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
                _ => Err(HrqaError::MissingCredential {
                    var: var.to_string(),
                }),
            }
        };

        Ok(Self {
            weaviate_url: fetch(&config.weaviate.url_env)?,
            openai_api_key: fetch(&config.openai.api_key_env)?,
            weaviate_api_key: fetch(&config.weaviate.api_key_env)?,
        })
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HrqaError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| HrqaError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load the file if present, otherwise fall back to validated defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        tracing::warn!(
            "Config file not found at {:?}, using defaults. Run 'hrqa config init' to create one.",
            path
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| HrqaError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: HRQA_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("HRQA_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "SERVER__HOST" => self.server.host = value.to_string(),
            "SERVER__PORT" => self.server.port = parse_value(path, value)?,
            "SERVER__UPLOAD_DIR" => self.server.upload_dir = PathBuf::from(value),
            "OPENAI__BASE_URL" => self.openai.base_url = value.to_string(),
            "EMBEDDING__MODEL" => self.embedding.model = value.to_string(),
            "EMBEDDING__DIMENSIONS" => self.embedding.dimensions = parse_value(path, value)?,
            "LLM__EXPANSION_MODEL" => self.llm.expansion_model = value.to_string(),
            "LLM__RERANK_MODEL" => self.llm.rerank_model = value.to_string(),
            "LLM__ANSWER_MODEL" => self.llm.answer_model = value.to_string(),
            "WEAVIATE__COLLECTION" => self.weaviate.collection = value.to_string(),
            "RETRIEVAL__SEARCH_LIMIT" => self.retrieval.search_limit = parse_value(path, value)?,
            "RETRIEVAL__ALPHA" => self.retrieval.alpha = parse_value(path, value)?,
            "RETRIEVAL__CONTEXT_SIZE" => self.retrieval.context_size = parse_value(path, value)?,
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| HrqaError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("hrqa").join("config.toml"))
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| HrqaError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}'", value),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                upload_dir: PathBuf::from("uploads"),
                max_upload_bytes: 50 * 1024 * 1024,
            },
            openai: OpenAiConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                timeout_secs: 120,
            },
            embedding: EmbeddingConfig {
                model: "text-embedding-3-small".to_string(),
                dimensions: 1536,
            },
            llm: LlmConfig {
                expansion_model: "gpt-4.1-mini".to_string(),
                rerank_model: "gpt-4o-mini".to_string(),
                answer_model: "gpt-4o-mini".to_string(),
            },
            weaviate: WeaviateConfig {
                url_env: "WEAVIATE_URL".to_string(),
                api_key_env: "WEAVIATE_API_KEY".to_string(),
                collection: "PDFDocument".to_string(),
                init_timeout_secs: 30,
                query_timeout_secs: 180,
                insert_timeout_secs: 180,
            },
            chunking: ChunkingConfig {
                chunk_size: 1000,
                overlap: 200,
            },
            ingest: IngestConfig {
                batch_size: 12,
                max_retries: 3,
                backoff_base_ms: 1000,
            },
            retrieval: RetrievalConfig {
                search_limit: 12,
                alpha: 0.3,
                context_size: 4,
                rerank_preview_chars: 400,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let mut config = Config::default();
        config.retrieval.search_limit = 20;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.retrieval.search_limit, 20);
        assert_eq!(loaded.weaviate.collection, "PDFDocument");
    }

    #[test]
    fn test_missing_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(&temp.path().join("nope.toml"));
        assert!(matches!(result, Err(HrqaError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_env_value_parsing() {
        let mut config = Config::default();
        config.set_value_from_env("RETRIEVAL__ALPHA", "0.5").unwrap();
        config.set_value_from_env("SERVER__PORT", "9000").unwrap();
        assert_eq!(config.retrieval.alpha, 0.5);
        assert_eq!(config.server.port, 9000);

        let err = config.set_value_from_env("SERVER__PORT", "abc");
        assert!(matches!(err, Err(HrqaError::InvalidConfigValue { .. })));
    }

    #[test]
    fn test_credentials_resolve() {
        let config = Config::default();
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("WEAVIATE_URL", "https://cluster.example"),
            ("WEAVIATE_API_KEY", "wv-test"),
        ]
        .into_iter()
        .collect();

        let creds = Credentials::resolve(&config, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(creds.weaviate_url, "https://cluster.example");
        assert!(!format!("{:?}", creds).contains("sk-test"));
    }

    #[test]
    fn test_missing_credential_is_fatal() {
        let config = Config::default();
        let result = Credentials::resolve(&config, |k| {
            (k == "WEAVIATE_URL").then(|| "https://cluster.example".to_string())
        });
        match result {
            Err(HrqaError::MissingCredential { var }) => assert_eq!(var, "OPENAI_API_KEY"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let config = Config::default();
        let result = Credentials::resolve(&config, |_| Some("   ".to_string()));
        assert!(matches!(result, Err(HrqaError::MissingCredential { .. })));
    }
}

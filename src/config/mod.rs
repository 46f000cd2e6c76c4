//! Configuration management for abr-search
//!
//! TOML configuration with schema versioning, environment overrides, and
//! structural validation before use.

use crate::error::{AbrError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub data: DataConfig,
    pub engine: EngineConfig,
    pub embedding: EmbeddingConfig,
    pub search: SearchConfig,
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

/// Bulk data location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory tree holding the ABR bulk extract `.xml` files
    pub data_dir: PathBuf,
}

/// Search engine connection settings
///
/// The password is looked up from the environment variable named by
/// `password_env`; it is never stored in the config file itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub endpoint: String,
    pub index: String,
    pub username: String,
    pub password_env: String,
    /// Accept self-signed certificates (dev clusters)
    #[serde(default)]
    pub insecure: bool,
    pub timeout_secs: u64,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name (e.g., "multilingual-e5-small")
    pub model: String,
    /// Batch size for passage encoding during indexing
    pub batch_size: usize,
    /// Prefix prepended to queries before encoding (E5-family contract)
    pub query_prefix: String,
    /// Prefix prepended to indexed passages before encoding
    pub passage_prefix: String,
}

/// Search dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of nearest neighbours for embedding search
    pub k: usize,
    /// Registered search template id for keyword search
    pub template_id: String,
    /// Document field holding the precomputed embedding
    pub vector_field: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            data: DataConfig {
                data_dir: PathBuf::from("~/abr-data"),
            },
            engine: EngineConfig {
                endpoint: "https://localhost:9200".to_string(),
                index: "abn".to_string(),
                username: "admin".to_string(),
                password_env: "ABR_ENGINE_PASSWORD".to_string(),
                insecure: false,
                timeout_secs: 30,
            },
            embedding: EmbeddingConfig {
                model: "multilingual-e5-small".to_string(),
                batch_size: 32,
                query_prefix: "query: ".to_string(),
                passage_prefix: "passage: ".to_string(),
            },
            search: SearchConfig {
                k: 10,
                template_id: "company_keyword_search_template".to_string(),
                vector_field: "company_embeddings".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AbrError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| AbrError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| AbrError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })
    }

    /// Default configuration file path (~/.config/abr-search/config.toml)
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AbrError::Config("Cannot determine config directory".to_string()))?;
        Ok(config_dir.join("abr-search").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// `ABR_ENGINE_ENDPOINT`, `ABR_ENGINE_INDEX`, and `ABR_DATA_DIR` override
    /// their config-file counterparts.
    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("ABR_ENGINE_ENDPOINT") {
            self.engine.endpoint = endpoint;
        }
        if let Ok(index) = std::env::var("ABR_ENGINE_INDEX") {
            self.engine.index = index;
        }
        if let Ok(dir) = std::env::var("ABR_DATA_DIR") {
            self.data.data_dir = PathBuf::from(dir);
        }
    }

    /// Resolve the engine password from the configured environment variable
    pub fn engine_password(&self) -> Result<String> {
        std::env::var(&self.engine.password_env).map_err(|_| {
            AbrError::Config(format!(
                "Engine password not set: export {}",
                self.engine.password_env
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn default_engine_contract_values() {
        let config = Config::default();
        assert_eq!(config.engine.index, "abn");
        assert_eq!(config.search.k, 10);
        assert_eq!(config.search.template_id, "company_keyword_search_template");
        assert_eq!(config.search.vector_field, "company_embeddings");
    }

    #[test]
    fn roundtrip_through_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let config = Config::default();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.meta.schema_version, config.meta.schema_version);
        assert_eq!(loaded.engine.endpoint, config.engine.endpoint);
        assert_eq!(loaded.embedding.model, config.embedding.model);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, AbrError::ConfigNotFound { .. }));
    }
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::llm::LlmConfig;
use crate::rag::{ColumnSchema, CorpusConfig, RetrievalConfig};

/// Effective application configuration after file, secrets and env layering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub corpus: CorpusConfig,
    pub retrieval: RetrievalConfig,
    pub columns: ColumnSchema,
    pub server: ServerConfig,
    pub cli: CliConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for an uploaded CSV, in bytes.
    pub max_upload_bytes: usize,
    /// Empty means the local development origins.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_bytes: 10 * 1024 * 1024,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub default_csv_path: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_csv_path: PathBuf::from("data/vdat_cox_mapping.csv"),
        }
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::paths::AppPaths;
use super::types::AppConfig;
use super::validation::validate_config;
use crate::llm::ProviderKind;
use crate::rag::RagError;

const REDACT_PLACEHOLDER: &str = "****";

const SENSITIVE_PATTERNS: [&str; 6] = [
    "api_key",
    "secret",
    "password",
    "_token",
    "credential",
    "bearer",
];

const SENSITIVE_WHITELIST: [&str; 2] = ["max_tokens", "num_predict"];

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("VEHICLE_RAG_CONFIG") {
            return PathBuf::from(path);
        }

        let user_config = self.paths.user_data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }

        self.paths.project_root.join("config.yml")
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.paths.secrets_path.clone()
    }

    /// Load `config.yml`, merge `secrets.yaml` over it, apply environment
    /// overrides and validate the result.
    pub fn load(&self) -> Result<AppConfig, RagError> {
        let public_config = load_yaml_file(&self.config_path())?;
        let secrets_config = load_yaml_file(&self.secrets_path())?;
        let mut merged = deep_merge(&public_config, &secrets_config);
        apply_env_overrides(&mut merged, |key| env::var(key).ok())?;

        let config = from_value(merged)?;
        tracing::debug!(
            "Effective config: {}",
            redact_sensitive_values(&serde_json::to_value(&config).unwrap_or_default())
        );
        Ok(config)
    }
}

/// Parse and validate a YAML document without touching files or the environment.
pub fn from_yaml_str(contents: &str) -> Result<AppConfig, RagError> {
    let value = parse_yaml(contents)?;
    from_value(value)
}

fn from_value(value: Value) -> Result<AppConfig, RagError> {
    let config: AppConfig = serde_json::from_value(value)
        .map_err(|e| RagError::InvalidConfig(format!("Invalid config: {}", e)))?;
    validate_config(&config)?;
    Ok(config)
}

fn parse_yaml(contents: &str) -> Result<Value, RagError> {
    if contents.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    match serde_yaml::from_str::<Value>(contents) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(Value::Null) => Ok(Value::Object(Map::new())),
        Ok(_) => Err(RagError::InvalidConfig(
            "Invalid config at 'root': expected object".to_string(),
        )),
        Err(e) => Err(RagError::InvalidConfig(format!("Invalid YAML: {}", e))),
    }
}

fn load_yaml_file(path: &Path) -> Result<Value, RagError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RagError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
    })?;
    parse_yaml(&contents).map_err(|e| match e {
        RagError::InvalidConfig(msg) => {
            RagError::InvalidConfig(format!("{} ({})", msg, path.display()))
        }
        other => other,
    })
}

fn apply_env_overrides<F>(config: &mut Value, lookup: F) -> Result<(), RagError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(provider) = lookup("VEHICLE_RAG_LLM_PROVIDER") {
        let kind = ProviderKind::parse(&provider).ok_or_else(|| {
            RagError::InvalidConfig(format!(
                "VEHICLE_RAG_LLM_PROVIDER: unknown provider '{}'",
                provider
            ))
        })?;
        set_field(config, "llm", "provider", serde_json::to_value(kind).unwrap_or_default());
    }
    if let Some(base_url) = lookup("VEHICLE_RAG_LLM_BASE_URL") {
        set_field(config, "llm", "base_url", Value::String(base_url));
    }
    if let Some(api_key) = lookup("VEHICLE_RAG_LLM_API_KEY") {
        set_field(config, "llm", "api_key", Value::String(api_key));
    }
    if let Some(port) = lookup("PORT") {
        let port: u16 = port.trim().parse().map_err(|_| {
            RagError::InvalidConfig(format!("PORT: '{}' is not a valid port", port))
        })?;
        set_field(config, "server", "port", Value::from(port));
    }
    Ok(())
}

fn set_field(config: &mut Value, section: &str, key: &str, value: Value) {
    if !config.is_object() {
        *config = Value::Object(Map::new());
    }
    if let Value::Object(root) = config {
        let entry = root
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(key.to_string(), value);
        }
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}

fn redact_sensitive_values(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::new();
            for (key, val) in map {
                if is_sensitive_key(key) && !val.is_null() {
                    redacted.insert(key.clone(), Value::String(REDACT_PLACEHOLDER.to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_values(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_sensitive_values).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    if SENSITIVE_WHITELIST
        .iter()
        .any(|allowed| *allowed == key_lower)
    {
        return false;
    }
    SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| key_lower.contains(pattern))
}

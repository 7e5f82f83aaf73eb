use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A single non-streaming generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: 0.0,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Ollama,
    OpenaiCompatible,
}

impl ProviderKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ollama" => Some(ProviderKind::Ollama),
            "openai_compatible" | "openai" | "lmstudio" => Some(ProviderKind::OpenaiCompatible),
            _ => None,
        }
    }
}

/// Connection settings shared by both service boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f64,
    /// Answer length cap; unset leaves it to the model.
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            base_url: "http://localhost:11434".to_string(),
            embedding_model: "mxbai-embed-large".to_string(),
            generation_model: "llama3.2:3b".to_string(),
            api_key: None,
            timeout_secs: 120,
            temperature: 0.0,
            max_tokens: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_accepts_aliases() {
        assert_eq!(ProviderKind::parse("Ollama"), Some(ProviderKind::Ollama));
        assert_eq!(
            ProviderKind::parse(" lmstudio "),
            Some(ProviderKind::OpenaiCompatible)
        );
        assert_eq!(ProviderKind::parse("llama_cpp"), None);
    }

    #[test]
    fn generation_request_defaults_to_zero_temperature() {
        let request = GenerationRequest::new(vec![ChatMessage::user("hi")]);
        assert_eq!(request.temperature, 0.0);
        assert!(request.max_tokens.is_none());
    }
}

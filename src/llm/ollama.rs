use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::ServiceError;
use super::provider::{EmbeddingProvider, GenerationProvider};
use super::types::{ChatMessage, GenerationRequest};

#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    embedding_model: String,
    generation_model: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(
        base_url: String,
        embedding_model: String,
        generation_model: String,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Unreachable(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            embedding_model,
            generation_model,
            client,
        })
    }
}

#[derive(Serialize)]
struct EmbedBody<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/api/embed", self.base_url);
        let body = EmbedBody {
            model: &self.embedding_model,
            input: inputs,
        };

        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }

        let payload: EmbedResponse = res.json().await.map_err(ServiceError::malformed)?;
        if payload.embeddings.len() != inputs.len() {
            return Err(ServiceError::MalformedResponse(format!(
                "Ollama returned {} embeddings for {} inputs",
                payload.embeddings.len(),
                inputs.len()
            )));
        }
        Ok(payload.embeddings)
    }
}

#[async_trait]
impl GenerationProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatBody {
            model: &self.generation_model,
            messages: &request.messages,
            stream: false,
            options: ChatOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }

        let payload: ChatResponse = res.json().await.map_err(ServiceError::malformed)?;
        payload
            .message
            .map(|m| m.content)
            .ok_or_else(|| ServiceError::MalformedResponse("Ollama reply missing message".into()))
    }
}

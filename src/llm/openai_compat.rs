use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde_json::{json, Value};

use super::error::ServiceError;
use super::provider::{EmbeddingProvider, GenerationProvider};
use super::types::GenerationRequest;

/// Client for servers speaking the OpenAI REST dialect (LM Studio, vLLM, llama.cpp server).
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    base_url: String,
    embedding_model: String,
    generation_model: String,
    client: Client,
}

impl OpenAiCompatProvider {
    pub fn new(
        base_url: String,
        api_key: Option<&str>,
        embedding_model: String,
        generation_model: String,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|_| ServiceError::Unreachable("invalid API key".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ServiceError::Unreachable(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            embedding_model,
            generation_model,
            client,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ServiceError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self.client.post(&url).json(body).send().await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let text = res.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body: text });
        }

        res.json().await.map_err(ServiceError::malformed)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai_compatible"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let body = json!({
            "model": self.embedding_model,
            "input": inputs,
        });
        let payload = self.post("/v1/embeddings", &body).await?;
        parse_embeddings(&payload, inputs.len())
    }
}

#[async_trait]
impl GenerationProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai_compatible"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError> {
        let mut body = json!({
            "model": self.generation_model,
            "messages": request.messages,
            "temperature": request.temperature,
            "stream": false,
        });
        if let (Some(obj), Some(limit)) = (body.as_object_mut(), request.max_tokens) {
            obj.insert("max_tokens".to_string(), json!(limit));
        }

        let payload = self.post("/v1/chat/completions", &body).await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::MalformedResponse("reply missing choices[0].message".into()))
    }
}

fn parse_embeddings(payload: &Value, expected: usize) -> Result<Vec<Vec<f32>>, ServiceError> {
    let data = payload["data"]
        .as_array()
        .ok_or_else(|| ServiceError::MalformedResponse("reply missing data array".into()))?;

    let mut indexed = Vec::with_capacity(data.len());
    for (position, item) in data.iter().enumerate() {
        let values = item["embedding"]
            .as_array()
            .ok_or_else(|| ServiceError::MalformedResponse("entry missing embedding".into()))?;
        let vector: Vec<f32> = values
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<_>>()
            .ok_or_else(|| ServiceError::MalformedResponse("non-numeric embedding value".into()))?;
        let index = item["index"].as_u64().map(|i| i as usize).unwrap_or(position);
        indexed.push((index, vector));
    }

    if indexed.len() != expected {
        return Err(ServiceError::MalformedResponse(format!(
            "returned {} embeddings for {} inputs",
            indexed.len(),
            expected
        )));
    }
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_embeddings_orders_by_index() {
        let payload = json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        });
        let vectors = parse_embeddings(&payload, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn parse_embeddings_rejects_count_mismatch() {
        let payload = json!({ "data": [ { "embedding": [1.0] } ] });
        let err = parse_embeddings(&payload, 2).unwrap_err();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }

    #[test]
    fn parse_embeddings_rejects_missing_data() {
        let err = parse_embeddings(&json!({ "error": "boom" }), 1).unwrap_err();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }
}

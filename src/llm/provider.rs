use async_trait::async_trait;

use super::error::ServiceError;
use super::types::GenerationRequest;

/// Turns text into fixed-length vectors, one per input, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// return the provider name (e.g. "ollama", "openai_compatible")
    fn name(&self) -> &str;

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ServiceError>;
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    fn name(&self) -> &str;

    /// chat completion (non-streaming)
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError>;
}

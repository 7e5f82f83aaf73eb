pub mod error;
pub mod ollama;
pub mod openai_compat;
pub mod provider;
pub mod types;

mod tests;

use std::sync::Arc;
use std::time::Duration;

pub use error::ServiceError;
pub use provider::{EmbeddingProvider, GenerationProvider};
pub use types::{ChatMessage, GenerationRequest, LlmConfig, ProviderKind};

use ollama::OllamaProvider;
use openai_compat::OpenAiCompatProvider;

/// The two service boundaries the pipeline talks to.
#[derive(Clone)]
pub struct Providers {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub generator: Arc<dyn GenerationProvider>,
}

pub fn build_providers(config: &LlmConfig) -> Result<Providers, ServiceError> {
    let timeout = Duration::from_secs(config.timeout_secs.max(1));
    match config.provider {
        ProviderKind::Ollama => {
            let provider = Arc::new(OllamaProvider::new(
                config.base_url.clone(),
                config.embedding_model.clone(),
                config.generation_model.clone(),
                timeout,
            )?);
            Ok(Providers {
                embedder: provider.clone(),
                generator: provider,
            })
        }
        ProviderKind::OpenaiCompatible => {
            let provider = Arc::new(OpenAiCompatProvider::new(
                config.base_url.clone(),
                config.api_key.as_deref(),
                config.embedding_model.clone(),
                config.generation_model.clone(),
                timeout,
            )?);
            Ok(Providers {
                embedder: provider.clone(),
                generator: provider,
            })
        }
    }
}

//! Query pipeline: turns a question plus its context block into an answer.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::RagError;
use super::prompt::{user_message, SYSTEM_TEMPLATE};
use crate::llm::{ChatMessage, GenerationProvider, GenerationRequest};

/// Produces the final answer text for a question.
///
/// The default implementation delegates all reasoning, including any
/// reference-list comparison, to the generation model.
#[async_trait]
pub trait AnswerComposer: Send + Sync {
    async fn answer(&self, question: &str, context_block: &str) -> Result<String, RagError>;
}

pub struct PromptAnswerComposer {
    generator: Arc<dyn GenerationProvider>,
    temperature: f64,
    max_tokens: Option<u32>,
}

impl PromptAnswerComposer {
    pub fn new(generator: Arc<dyn GenerationProvider>, temperature: f64) -> Self {
        Self {
            generator,
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn compose_request(&self, question: &str, context_block: &str) -> GenerationRequest {
        GenerationRequest::new(vec![
            ChatMessage::system(SYSTEM_TEMPLATE),
            ChatMessage::user(user_message(context_block, question)),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens)
    }
}

#[async_trait]
impl AnswerComposer for PromptAnswerComposer {
    async fn answer(&self, question: &str, context_block: &str) -> Result<String, RagError> {
        let request = self.compose_request(question, context_block);
        tracing::debug!(
            "Generating answer with {} ({} context chars)",
            self.generator.name(),
            context_block.len()
        );

        let output = self
            .generator
            .generate(&request)
            .await
            .map_err(RagError::GenerationService)?;
        Ok(output.trim().to_string())
    }
}

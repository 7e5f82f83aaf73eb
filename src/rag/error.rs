use thiserror::Error;

use crate::llm::ServiceError;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("embedding service error: {0}")]
    EmbeddingService(#[source] ServiceError),

    #[error("generation service error: {0}")]
    GenerationService(#[source] ServiceError),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl RagError {
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        RagError::MalformedInput(message.into())
    }
}

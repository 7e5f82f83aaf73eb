use thiserror::Error;

use crate::llm::ServiceError;
use crate::rag::RagError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] RagError),

    #[error("Failed to initialize model providers: {0}")]
    Providers(#[source] ServiceError),

    #[error("Failed to aggregate vehicle mappings: {0}")]
    Aggregation(#[source] RagError),

    #[error("Failed to build the vehicle corpus: {0}")]
    Corpus(#[source] RagError),
}

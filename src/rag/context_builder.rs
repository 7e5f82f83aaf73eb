//! Retrieval Context Assembler.
//!
//! Builds the context block handed to generation by:
//! 1. Embedding the query
//! 2. Selecting the top-k nearest fragments from the index
//! 3. Annotating each hit with its trim count and entity citation

use serde::{Deserialize, Serialize};

use super::error::RagError;
use super::record::TARGET_CATALOG;
use super::store::{MetadataFilter, SearchHit, SimilarityIndex};
use crate::llm::{EmbeddingProvider, ServiceError};

/// Configuration for retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of fragments included in the context block
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

pub struct ContextAssembler {
    config: RetrievalConfig,
}

impl ContextAssembler {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Nearest hits for `query`, closest first.
    ///
    /// An empty index returns no hits without calling the embedder.
    pub async fn retrieve(
        &self,
        query: &str,
        index: &dyn SimilarityIndex,
        embedder: &dyn EmbeddingProvider,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchHit>, RagError> {
        if index.is_empty() {
            tracing::warn!("Retrieval against an empty index; context will be empty");
            return Ok(Vec::new());
        }

        let mut vectors = embedder
            .embed(&[query.to_string()])
            .await
            .map_err(RagError::EmbeddingService)?;
        let query_vector = match vectors.pop() {
            Some(vector) if vectors.is_empty() && vector.iter().all(|x| x.is_finite()) => vector,
            _ => {
                return Err(RagError::EmbeddingService(ServiceError::malformed(
                    "expected exactly one finite query embedding",
                )))
            }
        };

        let hits = index.search(&query_vector, self.config.top_k, filter)?;
        tracing::debug!(
            "Retrieved {} hits: {:?}",
            hits.len(),
            hits.iter().map(|h| h.metadata.entity_key.as_str()).collect::<Vec<_>>()
        );
        Ok(hits)
    }

    /// Retrieve and render the citation-tagged context block for `query`.
    pub async fn retrieve_context(
        &self,
        query: &str,
        index: &dyn SimilarityIndex,
        embedder: &dyn EmbeddingProvider,
        filter: Option<&MetadataFilter>,
    ) -> Result<String, RagError> {
        let hits = self.retrieve(query, index, embedder, filter).await?;
        Ok(format_hits(&hits))
    }
}

/// Render hits as `[entity_key] text` blocks separated by a blank line.
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| {
            let mut content = hit.text.trim().to_string();
            if hit.metadata.trim_count > 0 {
                content.push_str(&format!(
                    "\n(This vehicle has {} {} trim(s) mapped)",
                    hit.metadata.trim_count, TARGET_CATALOG
                ));
            }
            format!("[{}] {}", hit.metadata.entity_key, content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Entity keys cited in a context block, in first-seen order.
pub fn cited_sources(hits: &[SearchHit]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for hit in hits {
        if !sources.contains(&hit.metadata.entity_key) {
            sources.push(hit.metadata.entity_key.clone());
        }
    }
    sources
}

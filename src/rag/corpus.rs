//! Corpus Builder.
//!
//! Splits each record's rendered text into overlapping fragments, embeds them
//! in batches and loads the result into an in-memory similarity index.

use serde::{Deserialize, Serialize};

use super::error::RagError;
use super::record::{EntityRecord, FragmentMetadata};
use super::store::{InMemoryIndex, SimilarityIndex};
use crate::llm::{EmbeddingProvider, ServiceError};

/// Configuration for fragmenting and embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Maximum fragment size in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive fragments
    pub chunk_overlap: usize,
    /// Maximum fragments per embedding request
    pub embed_batch_size: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
            embed_batch_size: 32,
        }
    }
}

impl CorpusConfig {
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidConfig("corpus.chunk_size must be > 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "corpus.chunk_overlap ({}) must be smaller than corpus.chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.embed_batch_size == 0 {
            return Err(RagError::InvalidConfig(
                "corpus.embed_batch_size must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// A bounded slice of one record's rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub text: String,
    pub metadata: FragmentMetadata,
}

/// Split text into fixed-size character windows that overlap by `overlap`.
///
/// The final window may be shorter; an empty text yields no windows.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let total_chars = chars.len();
    let mut windows = Vec::new();

    if total_chars == 0 || chunk_size == 0 {
        return windows;
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(total_chars);
        windows.push(chars[start..end].iter().collect());
        if end == total_chars {
            break;
        }
        start += step;
    }

    windows
}

pub struct CorpusBuilder {
    config: CorpusConfig,
}

impl CorpusBuilder {
    pub fn new(config: CorpusConfig) -> Result<Self, RagError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    /// Fragments of one record, each carrying a copy of the record's metadata.
    pub fn fragment(&self, record: &EntityRecord) -> Vec<Fragment> {
        let metadata = record.metadata();
        split_text(
            record.rendered_text(),
            self.config.chunk_size,
            self.config.chunk_overlap,
        )
        .into_iter()
        .map(|text| Fragment {
            text,
            metadata: metadata.clone(),
        })
        .collect()
    }

    pub fn fragments(&self, records: &[EntityRecord]) -> Vec<Fragment> {
        records.iter().flat_map(|record| self.fragment(record)).collect()
    }

    /// Embed every fragment and load it into a fresh index.
    ///
    /// Any embedding failure fails the whole build; no partial corpus is returned.
    pub async fn build(
        &self,
        records: &[EntityRecord],
        embedder: &dyn EmbeddingProvider,
    ) -> Result<InMemoryIndex, RagError> {
        let fragments = self.fragments(records);
        let mut index = InMemoryIndex::new();

        tracing::info!(
            "Embedding {} fragments from {} records with {}",
            fragments.len(),
            records.len(),
            embedder.name()
        );

        let mut remaining = fragments.into_iter().peekable();
        while remaining.peek().is_some() {
            let batch: Vec<Fragment> = remaining
                .by_ref()
                .take(self.config.embed_batch_size)
                .collect();
            let inputs: Vec<String> = batch.iter().map(|f| f.text.clone()).collect();

            let vectors = embedder
                .embed(&inputs)
                .await
                .map_err(RagError::EmbeddingService)?;
            if vectors.len() != batch.len() {
                return Err(RagError::EmbeddingService(ServiceError::malformed(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                ))));
            }
            if vectors.iter().any(|v| v.is_empty()) {
                return Err(RagError::EmbeddingService(ServiceError::malformed(
                    "received an empty embedding vector",
                )));
            }
            if vectors.iter().any(|v| v.iter().any(|x| !x.is_finite())) {
                return Err(RagError::EmbeddingService(ServiceError::malformed(
                    "received a non-finite embedding value",
                )));
            }

            index
                .insert_batch(batch.into_iter().zip(vectors).collect())
                .map_err(|e| match e {
                    RagError::DimensionMismatch { expected, actual } => {
                        RagError::EmbeddingService(ServiceError::malformed(format!(
                            "embedding dimension changed from {} to {}",
                            expected, actual
                        )))
                    }
                    other => other,
                })?;
        }

        tracing::info!(
            "Corpus ready: {} fragments, dimension {:?}",
            index.len(),
            index.dimension()
        );
        Ok(index)
    }
}

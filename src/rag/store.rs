//! SimilarityIndex trait and the exact in-memory implementation.
//!
//! The index is built once per dataset, then shared read-only behind an `Arc`.

use serde::Serialize;

use super::corpus::Fragment;
use super::error::RagError;
use super::record::{FragmentMetadata, MetadataValue};

/// A stored fragment with its embedding vector.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub fragment: Fragment,
    pub vector: Vec<f32>,
}

/// Result of a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub text: String,
    pub metadata: FragmentMetadata,
    /// Cosine distance (lower = closer).
    pub distance: f32,
}

/// Equality predicate on one metadata field, applied before ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFilter {
    pub field: String,
    pub value: MetadataValue,
}

impl MetadataFilter {
    pub fn new(field: impl Into<String>, value: MetadataValue) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }

    pub fn matches(&self, metadata: &FragmentMetadata) -> bool {
        metadata.field(&self.field).as_ref() == Some(&self.value)
    }
}

/// Abstract interface for similarity search backends.
pub trait SimilarityIndex: Send + Sync {
    /// Insert fragments with their embedding vectors.
    ///
    /// The first insert fixes the vector dimension.
    fn insert_batch(&mut self, items: Vec<(Fragment, Vec<f32>)>) -> Result<(), RagError>;

    /// Top-`k` fragments by increasing distance to `query`.
    fn search(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchHit>, RagError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dimension(&self) -> Option<usize>;
}

/// Exact cosine search over every stored entry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    entries: Vec<IndexEntry>,
    dimension: Option<usize>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    fn check_dimension(&self, actual: usize) -> Result<(), RagError> {
        match self.dimension {
            Some(expected) if expected != actual => {
                Err(RagError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

impl SimilarityIndex for InMemoryIndex {
    fn insert_batch(&mut self, items: Vec<(Fragment, Vec<f32>)>) -> Result<(), RagError> {
        // Validate the whole batch before touching the index.
        let expected = self
            .dimension
            .or_else(|| items.first().map(|(_, v)| v.len()));
        if let Some(expected) = expected {
            for (_, vector) in &items {
                if vector.len() != expected {
                    return Err(RagError::DimensionMismatch {
                        expected,
                        actual: vector.len(),
                    });
                }
            }
        }

        self.dimension = expected;
        self.entries.extend(
            items
                .into_iter()
                .map(|(fragment, vector)| IndexEntry { fragment, vector }),
        );
        Ok(())
    }

    fn search(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchHit>, RagError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        self.check_dimension(query.len())?;

        let mut scored: Vec<(f32, &IndexEntry)> = self
            .entries
            .iter()
            .filter(|entry| filter.map_or(true, |f| f.matches(&entry.fragment.metadata)))
            .map(|entry| (1.0 - cosine_similarity(query, &entry.vector), entry))
            .collect();

        // Stable sort keeps insertion order for equal distances.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(distance, entry)| SearchHit {
                text: entry.fragment.text.clone(),
                metadata: entry.fragment.metadata.clone(),
                distance,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

/// Cosine similarity between two vectors; zero and non-finite vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for i in 0..a.len() {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return 0.0;
    }
    similarity.clamp(-1.0, 1.0)
}

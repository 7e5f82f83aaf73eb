//! RAG (Retrieval-Augmented Generation) module.
//!
//! This module provides:
//! - `RecordAggregator`: Collapses raw mapping rows into one record per vehicle model
//! - `CorpusBuilder`: Fragments and embeds records into a `SimilarityIndex`
//! - `ContextAssembler`: Builds citation-tagged context blocks for a query
//! - `AnswerComposer`: Produces the final answer from question and context

pub mod aggregator;
pub mod context_builder;
pub mod corpus;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod record;
pub mod schema;
pub mod store;
pub mod table;

pub use aggregator::{aggregate, Aggregation, RecordAggregator};
pub use context_builder::{format_hits, ContextAssembler, RetrievalConfig};
pub use corpus::{split_text, CorpusBuilder, CorpusConfig, Fragment};
pub use error::RagError;
pub use pipeline::{AnswerComposer, PromptAnswerComposer};
pub use prompt::{QueryMode, ReferenceCollection};
pub use record::{EntityRecord, FragmentMetadata, MappingFlags, MetadataValue};
pub use schema::ColumnSchema;
pub use store::{InMemoryIndex, MetadataFilter, SearchHit, SimilarityIndex};
pub use table::RawTable;

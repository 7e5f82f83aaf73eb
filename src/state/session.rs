use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::error::InitializationError;
use crate::core::config::AppConfig;
use crate::llm::{EmbeddingProvider, Providers};
use crate::rag::context_builder::cited_sources;
use crate::rag::{
    aggregate, format_hits, AnswerComposer, ContextAssembler, CorpusBuilder, InMemoryIndex,
    PromptAnswerComposer, QueryMode, RagError, RawTable, SimilarityIndex,
};

/// Reply shown to the user whenever a question could not be answered.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I couldn't process that question right now. Please try again.";

/// Outcome of one question, safe to show to an end user.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub success: bool,
    pub response: String,
    pub question: String,
    pub mode: QueryMode,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub source_name: String,
    pub vehicle_count: usize,
    pub fragment_count: usize,
    pub placeholder: bool,
    pub created_at: DateTime<Utc>,
}

/// A loaded dataset together with everything needed to answer questions about it.
///
/// Owned by its caller; dropping it releases the index.
pub struct RagSession {
    source_name: String,
    vehicle_count: usize,
    placeholder: bool,
    index: Arc<InMemoryIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    assembler: ContextAssembler,
    composer: Arc<dyn AnswerComposer>,
    created_at: DateTime<Utc>,
}

impl RagSession {
    /// Aggregate `table`, embed the corpus and wire up the answer pipeline.
    pub async fn initialize(
        table: &RawTable,
        source_name: impl Into<String>,
        config: &AppConfig,
        providers: &Providers,
    ) -> Result<Self, InitializationError> {
        let source_name = source_name.into();
        let aggregation =
            aggregate(table, &config.columns).map_err(InitializationError::Aggregation)?;

        let builder =
            CorpusBuilder::new(config.corpus.clone()).map_err(InitializationError::Corpus)?;
        let index = builder
            .build(aggregation.records(), providers.embedder.as_ref())
            .await
            .map_err(InitializationError::Corpus)?;

        tracing::info!(
            "Session ready for {}: {} vehicles, {} fragments",
            source_name,
            aggregation.entity_count(),
            index.len()
        );

        Ok(Self {
            source_name,
            vehicle_count: aggregation.entity_count(),
            placeholder: aggregation.is_placeholder(),
            index: Arc::new(index),
            embedder: providers.embedder.clone(),
            assembler: ContextAssembler::new(config.retrieval.clone()),
            composer: Arc::new(
                PromptAnswerComposer::new(providers.generator.clone(), config.llm.temperature)
                    .with_max_tokens(config.llm.max_tokens),
            ),
            created_at: Utc::now(),
        })
    }

    /// Replace the answer composer, e.g. with a deterministic one.
    pub fn with_composer(mut self, composer: Arc<dyn AnswerComposer>) -> Self {
        self.composer = composer;
        self
    }

    /// Retrieve context and generate an answer, surfacing typed failures.
    pub async fn try_answer(&self, question: &str) -> Result<(String, Vec<String>), RagError> {
        let hits = self
            .assembler
            .retrieve(question, self.index.as_ref(), self.embedder.as_ref(), None)
            .await?;
        let context = format_hits(&hits);
        let response = self.composer.answer(question, &context).await?;
        Ok((response, cited_sources(&hits)))
    }

    /// Answer a question. Failures become the fallback reply and are logged.
    pub async fn answer(&self, question: &str) -> QueryOutcome {
        let mode = QueryMode::of(question);
        tracing::debug!("Answering {} question: {}", mode.as_str(), question);

        match self.try_answer(question).await {
            Ok((response, sources)) => QueryOutcome {
                success: true,
                response,
                question: question.to_string(),
                mode,
                sources,
            },
            Err(e) => {
                tracing::error!("Failed to answer question for {}: {}", self.source_name, e);
                QueryOutcome {
                    success: false,
                    response: FALLBACK_ANSWER.to_string(),
                    question: question.to_string(),
                    mode,
                    sources: Vec::new(),
                }
            }
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            source_name: self.source_name.clone(),
            vehicle_count: self.vehicle_count,
            fragment_count: self.index.len(),
            placeholder: self.placeholder,
            created_at: self.created_at,
        }
    }

    /// Tear the session down explicitly.
    pub fn close(self) {
        tracing::info!("Closing session for {}", self.source_name);
    }
}

/// Per-client sessions keyed by session id.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<RagSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<RagSession>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Install a session, replacing (and returning) any previous one.
    pub async fn install(
        &self,
        session_id: &str,
        session: RagSession,
    ) -> Option<Arc<RagSession>> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), Arc::new(session))
    }

    pub async fn remove(&self, session_id: &str) -> Option<Arc<RagSession>> {
        self.sessions.write().await.remove(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

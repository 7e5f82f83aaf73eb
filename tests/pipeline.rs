mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{fake_providers, EchoGenerator, HashingEmbedder, UnreachableEmbedder, MAPPING_CSV};
use vehicle_rag::core::config::AppConfig;
use vehicle_rag::llm::{EmbeddingProvider, Providers, ServiceError};
use vehicle_rag::rag::prompt::SYSTEM_TEMPLATE;
use vehicle_rag::rag::{
    aggregate, split_text, AnswerComposer, ColumnSchema, ContextAssembler, CorpusBuilder,
    CorpusConfig, MetadataFilter, MetadataValue, QueryMode, RagError, RawTable,
    ReferenceCollection, RetrievalConfig,
};
use vehicle_rag::state::error::InitializationError;
use vehicle_rag::state::{RagSession, FALLBACK_ANSWER};

fn mapping_table() -> RawTable {
    RawTable::from_reader(MAPPING_CSV.as_bytes()).unwrap()
}

#[test]
fn audi_a3_rows_collapse_into_one_record() {
    let aggregation = aggregate(&mapping_table(), &ColumnSchema::default()).unwrap();
    let records = aggregation.records();

    let audi = records
        .iter()
        .find(|r| r.entity_key() == "audi_a3")
        .unwrap();
    assert_eq!(audi.source_make(), "Audi");
    assert_eq!(audi.source_model(), "A3");
    assert_eq!(audi.target().trim_names.as_slice(), &["Premium", "Premium Plus"]);
    assert_eq!(audi.trim_count(), 2);
    assert!(audi.flags().maps_to_multiple_target_trims);
}

#[test]
fn every_row_lands_in_exactly_one_record() {
    let table = mapping_table();
    let aggregation = aggregate(&table, &ColumnSchema::default()).unwrap();

    let total: usize = aggregation
        .records()
        .iter()
        .map(|r| r.source_row_count())
        .sum();
    assert_eq!(total, table.len());

    for record in aggregation.records() {
        assert_eq!(record.trim_count(), record.target().trim_names.len());
    }
}

#[test]
fn repeated_attribute_values_are_kept_once_in_first_seen_order() {
    let aggregation = aggregate(&mapping_table(), &ColumnSchema::default()).unwrap();

    for record in aggregation.records() {
        let target = record.target();
        let sets = [
            ("model_names", &target.model_names),
            ("model_codes", &target.model_codes),
            ("series_names", &target.series_names),
            ("series_codes", &target.series_codes),
            ("trim_names", &target.trim_names),
            ("trim_codes", &target.trim_codes),
            ("body_style_names", &target.body_style_names),
            ("body_style_codes", &target.body_style_codes),
            ("fuel_type_codes", &target.fuel_type_codes),
            ("fuel_type_names", &target.fuel_type_names),
        ];
        for (name, set) in sets {
            let values = set.as_slice();
            for (i, value) in values.iter().enumerate() {
                assert!(
                    !values[i + 1..].contains(value),
                    "{} of {} repeats {}",
                    name,
                    record.entity_key(),
                    value
                );
            }
        }
    }

    let audi = aggregation
        .records()
        .iter()
        .find(|r| r.entity_key() == "audi_a3")
        .unwrap();
    let target = audi.target();
    assert_eq!(audi.source_row_count(), 3);
    assert_eq!(target.model_names.as_slice(), &["A3"]);
    assert_eq!(target.model_codes.as_slice(), &["A3"]);
    assert_eq!(target.series_names.as_slice(), &["A3"]);
    assert_eq!(target.series_codes.as_slice(), &["A3S"]);
    assert_eq!(target.trim_codes.as_slice(), &["PRM", "PRP"]);
    assert_eq!(target.body_style_names.as_slice(), &["Sedan", "Convertible"]);
    assert_eq!(target.body_style_codes.as_slice(), &["SED", "CNV"]);
    assert_eq!(target.fuel_type_codes.as_slice(), &["GAS"]);
    assert_eq!(target.fuel_type_names.as_slice(), &["Gasoline"]);
    assert!(audi
        .rendered_text()
        .contains("Cox Body Styles: Sedan, Convertible"));
}

#[test]
fn fragments_reconstruct_rendered_text() {
    let aggregation = aggregate(&mapping_table(), &ColumnSchema::default()).unwrap();
    let config = CorpusConfig {
        chunk_size: 60,
        chunk_overlap: 15,
        embed_batch_size: 4,
    };
    let builder = CorpusBuilder::new(config.clone()).unwrap();

    for record in aggregation.records() {
        let fragments = builder.fragment(record);
        assert!(fragments.len() > 1);

        let mut rebuilt = String::new();
        for (i, fragment) in fragments.iter().enumerate() {
            assert!(fragment.text.chars().count() <= config.chunk_size);
            assert_eq!(fragment.metadata.entity_key, record.entity_key());
            if i == 0 {
                rebuilt.push_str(&fragment.text);
            } else {
                rebuilt.extend(fragment.text.chars().skip(config.chunk_overlap));
            }
        }
        assert_eq!(rebuilt, record.rendered_text());
    }

    assert_eq!(
        split_text("abc", 60, 15),
        vec!["abc".to_string()],
        "short text keeps its tail"
    );
}

#[tokio::test]
async fn context_block_cites_and_enriches_hits() {
    let aggregation = aggregate(&mapping_table(), &ColumnSchema::default()).unwrap();
    let index = CorpusBuilder::new(CorpusConfig::default())
        .unwrap()
        .build(aggregation.records(), &HashingEmbedder)
        .await
        .unwrap();
    let assembler = ContextAssembler::new(RetrievalConfig::default());

    let context = assembler
        .retrieve_context("What Cox trims are mapped to Audi A3?", &index, &HashingEmbedder, None)
        .await
        .unwrap();

    assert!(context.starts_with("[audi_a3] Model ID: audi_a3"));
    assert!(context.contains("(This vehicle has 2 Cox trim(s) mapped)"));
    assert_eq!(context.matches("\n\n[").count(), 2, "three hits separated by blank lines");
}

#[tokio::test]
async fn metadata_filter_narrows_retrieval() {
    let aggregation = aggregate(&mapping_table(), &ColumnSchema::default()).unwrap();
    let index = CorpusBuilder::new(CorpusConfig::default())
        .unwrap()
        .build(aggregation.records(), &HashingEmbedder)
        .await
        .unwrap();
    let assembler = ContextAssembler::new(RetrievalConfig::default());
    let filter = MetadataFilter::new("fuel_types", MetadataValue::Text("Electric".to_string()));

    let context = assembler
        .retrieve_context("Show me electric vehicles", &index, &HashingEmbedder, Some(&filter))
        .await
        .unwrap();

    assert!(context.starts_with("[tesla_model-3]"));
    assert!(!context.contains("[audi_a3]"));
}

#[tokio::test]
async fn session_answers_with_template_and_context() {
    let (providers, generator) = fake_providers();
    let session = RagSession::initialize(&mapping_table(), "mapping.csv", &AppConfig::default(), &providers)
        .await
        .unwrap();

    let outcome = session.answer("What Cox trims are mapped to Audi A3?").await;

    assert!(outcome.success);
    assert_eq!(outcome.mode, QueryMode::Simple);
    assert_eq!(outcome.sources.first().map(String::as_str), Some("audi_a3"));
    assert!(outcome.response.starts_with("CONTEXT:\n[audi_a3]"));
    assert!(outcome.response.ends_with("QUESTION: What Cox trims are mapped to Audi A3?"));

    let request = generator.last_request().unwrap();
    assert_eq!(request.messages[0].content, SYSTEM_TEMPLATE);
    assert_eq!(request.temperature, 0.0);
    assert_eq!(session.stats().vehicle_count, 3);
}

#[tokio::test]
async fn comparison_question_carries_reference_list_to_generation() {
    let (providers, generator) = fake_providers();
    let session = RagSession::initialize(&mapping_table(), "mapping.csv", &AppConfig::default(), &providers)
        .await
        .unwrap();
    let question = r#"Compare Audi A3 against ["Premium","Premium Plus","Prestige"]"#;

    let outcome = session.answer(question).await;

    assert_eq!(outcome.mode, QueryMode::Comparison);
    let request = generator.last_request().unwrap();
    assert!(request.messages[0].content.contains("the missing trims are"));
    assert!(request.messages[1]
        .content
        .contains(r#"["Premium","Premium Plus","Prestige"]"#));
    assert!(request.messages[1].content.contains("Cox Trims: Premium, Premium Plus"));
}

#[tokio::test]
async fn configured_answer_limit_reaches_generation() {
    let (providers, generator) = fake_providers();
    let mut config = AppConfig::default();
    config.llm.max_tokens = Some(256);
    config.llm.temperature = 0.2;
    let session = RagSession::initialize(&mapping_table(), "mapping.csv", &config, &providers)
        .await
        .unwrap();

    session.answer("What trims does the Audi A3 have?").await;

    let request = generator.last_request().unwrap();
    assert_eq!(request.max_tokens, Some(256));
    assert_eq!(request.temperature, 0.2);
}

/// Set difference computed in code instead of by the model.
struct SetDifferenceComposer;

#[async_trait]
impl AnswerComposer for SetDifferenceComposer {
    async fn answer(&self, question: &str, context_block: &str) -> Result<String, RagError> {
        let current: Vec<&str> = context_block
            .lines()
            .find_map(|line| line.strip_prefix("Cox Trims: "))
            .map(|trims| trims.split(", ").collect())
            .unwrap_or_default();
        let Some(reference) = ReferenceCollection::detect(question) else {
            return Ok(current.iter().map(|t| format!("• {}", t)).collect::<Vec<_>>().join("\n"));
        };
        let missing: Vec<String> = reference
            .items()
            .iter()
            .filter(|item| !current.contains(&item.as_str()))
            .map(|item| format!("• {}", item))
            .collect();
        Ok(format!(
            "Current:\n{}\n\nMissing:\n{}",
            current.iter().map(|t| format!("• {}", t)).collect::<Vec<_>>().join("\n"),
            missing.join("\n")
        ))
    }
}

#[tokio::test]
async fn comparison_lists_current_then_missing_only() {
    let (providers, _) = fake_providers();
    let session = RagSession::initialize(&mapping_table(), "mapping.csv", &AppConfig::default(), &providers)
        .await
        .unwrap()
        .with_composer(Arc::new(SetDifferenceComposer));

    let outcome = session
        .answer(r#"Which Audi A3 trims are missing from ["Premium","Premium Plus","Prestige"]?"#)
        .await;

    assert!(outcome.success);
    assert_eq!(
        outcome.response,
        "Current:\n• Premium\n• Premium Plus\n\nMissing:\n• Prestige"
    );
}

#[tokio::test]
async fn placeholder_corpus_still_answers() {
    let (providers, generator) = fake_providers();
    let header_only = MAPPING_CSV.lines().next().unwrap().to_string() + "\n";
    let table = RawTable::from_reader(header_only.as_bytes()).unwrap();

    let session = RagSession::initialize(&table, "empty.csv", &AppConfig::default(), &providers)
        .await
        .unwrap();
    let outcome = session.answer("What trims does the Audi A3 have?").await;

    assert!(outcome.success);
    assert!(session.stats().placeholder);
    assert_eq!(session.stats().vehicle_count, 0);
    assert!(outcome.response.starts_with("CONTEXT:\n[placeholder] This is a placeholder document"));
    assert!(!outcome.response.contains("trim(s) mapped"));
    assert_eq!(generator.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn embedding_outage_fails_initialization() {
    let providers = Providers {
        embedder: Arc::new(UnreachableEmbedder),
        generator: Arc::new(EchoGenerator::default()),
    };

    let result =
        RagSession::initialize(&mapping_table(), "mapping.csv", &AppConfig::default(), &providers).await;

    assert!(matches!(
        result,
        Err(InitializationError::Corpus(RagError::EmbeddingService(_)))
    ));
}

/// Embeds corpus fragments but refuses anything else, i.e. live questions.
struct CorpusOnlyEmbedder;

#[async_trait]
impl EmbeddingProvider for CorpusOnlyEmbedder {
    fn name(&self) -> &str {
        "corpus-only"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        if inputs.iter().all(|text| text.contains("Model ID") || text.contains("Cox")) {
            return Ok(inputs.iter().map(|text| HashingEmbedder::vector(text)).collect());
        }
        Err(ServiceError::Timeout)
    }
}

#[tokio::test]
async fn query_time_outage_returns_fallback() {
    let providers = Providers {
        embedder: Arc::new(CorpusOnlyEmbedder),
        generator: Arc::new(EchoGenerator::default()),
    };
    let session = RagSession::initialize(&mapping_table(), "mapping.csv", &AppConfig::default(), &providers)
        .await
        .unwrap();

    let outcome = session.answer("Which models need body style mapping?").await;

    assert!(!outcome.success);
    assert_eq!(outcome.response, FALLBACK_ANSWER);
    assert!(outcome.sources.is_empty());
    assert!(matches!(
        session.try_answer("Which models need body style mapping?").await,
        Err(RagError::EmbeddingService(ServiceError::Timeout))
    ));
}

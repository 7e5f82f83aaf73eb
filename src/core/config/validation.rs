use super::types::AppConfig;
use crate::rag::RagError;

pub fn validate_config(config: &AppConfig) -> Result<(), RagError> {
    let llm = &config.llm;
    validate_url("llm.base_url", &llm.base_url)?;
    validate_required_string("llm.embedding_model", &llm.embedding_model)?;
    validate_required_string("llm.generation_model", &llm.generation_model)?;
    validate_u64_range("llm.timeout_secs", llm.timeout_secs, 1, 3_600)?;
    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(invalid("llm.temperature", "must be between 0 and 2"));
    }
    if let Some(max_tokens) = llm.max_tokens {
        validate_u64_range("llm.max_tokens", max_tokens as u64, 1, 32_768)?;
    }

    let corpus = &config.corpus;
    validate_u64_range("corpus.chunk_size", corpus.chunk_size as u64, 1, 100_000)?;
    if corpus.chunk_overlap >= corpus.chunk_size {
        return Err(invalid(
            "corpus.chunk_overlap",
            "must be smaller than corpus.chunk_size",
        ));
    }
    validate_u64_range(
        "corpus.embed_batch_size",
        corpus.embed_batch_size as u64,
        1,
        10_000,
    )?;

    validate_u64_range("retrieval.top_k", config.retrieval.top_k as u64, 1, 100)?;

    let columns = &config.columns;
    for (index, name) in columns.required_columns().iter().enumerate() {
        validate_required_string(&format!("columns.required[{}]", index), name)?;
    }
    if columns.affirmative_markers.iter().all(|m| m.trim().is_empty()) {
        return Err(invalid(
            "columns.affirmative_markers",
            "at least one non-empty marker is required",
        ));
    }

    let server = &config.server;
    validate_required_string("server.host", &server.host)?;
    validate_u64_range(
        "server.max_upload_bytes",
        server.max_upload_bytes as u64,
        1,
        1_073_741_824,
    )?;
    for (index, origin) in server.cors_allowed_origins.iter().enumerate() {
        validate_required_string(&format!("server.cors_allowed_origins[{}]", index), origin)?;
    }

    Ok(())
}

fn validate_u64_range(path: &str, value: u64, min: u64, max: u64) -> Result<(), RagError> {
    if value < min || value > max {
        return Err(invalid(path, &format!("must be between {} and {}", min, max)));
    }
    Ok(())
}

fn validate_required_string(path: &str, value: &str) -> Result<(), RagError> {
    if value.trim().is_empty() {
        return Err(invalid(path, "value cannot be empty"));
    }
    Ok(())
}

fn validate_url(path: &str, value: &str) -> Result<(), RagError> {
    validate_required_string(path, value)?;
    let lower = value.trim().to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Err(invalid(path, "expected an http(s) URL"));
    }
    Ok(())
}

fn invalid(path: &str, reason: &str) -> RagError {
    RagError::InvalidConfig(format!("Invalid config at '{}': {}", path, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<(), RagError>) -> String {
        match result {
            Err(RagError::InvalidConfig(msg)) => msg,
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        assert!(message(validate_config(&config)).contains("retrieval.top_k"));

        let mut config = AppConfig::default();
        config.corpus.chunk_overlap = config.corpus.chunk_size;
        assert!(message(validate_config(&config)).contains("corpus.chunk_overlap"));

        let mut config = AppConfig::default();
        config.llm.temperature = 2.5;
        assert!(message(validate_config(&config)).contains("llm.temperature"));

        let mut config = AppConfig::default();
        config.llm.timeout_secs = 0;
        assert!(message(validate_config(&config)).contains("llm.timeout_secs"));

        let mut config = AppConfig::default();
        config.llm.max_tokens = Some(0);
        assert!(message(validate_config(&config)).contains("llm.max_tokens"));
    }

    #[test]
    fn rejects_bad_urls_and_empty_names() {
        let mut config = AppConfig::default();
        config.llm.base_url = "localhost:11434".to_string();
        assert!(message(validate_config(&config)).contains("llm.base_url"));

        let mut config = AppConfig::default();
        config.llm.generation_model = "  ".to_string();
        assert!(message(validate_config(&config)).contains("llm.generation_model"));

        let mut config = AppConfig::default();
        config.columns.entity_key = String::new();
        assert!(message(validate_config(&config)).contains("columns.required[0]"));
    }
}

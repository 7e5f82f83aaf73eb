#[cfg(test)]
mod tests {
    use crate::llm::{build_providers, ChatMessage, GenerationRequest, LlmConfig, ProviderKind};

    #[test]
    fn build_providers_routes_by_kind() {
        let mut config = LlmConfig::default();
        let providers = build_providers(&config).expect("ollama providers");
        assert_eq!(providers.embedder.name(), "ollama");
        assert_eq!(providers.generator.name(), "ollama");

        config.provider = ProviderKind::OpenaiCompatible;
        config.base_url = "http://localhost:1234".to_string();
        config.api_key = Some("sk-local".to_string());
        let providers = build_providers(&config).expect("openai-compatible providers");
        assert_eq!(providers.embedder.name(), "openai_compatible");
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_ollama_connection() {
        let providers = build_providers(&LlmConfig::default()).expect("providers");

        let vectors = providers
            .embedder
            .embed(&["Audi A3 Premium".to_string()])
            .await;
        match vectors {
            Ok(vectors) => println!("Ollama embedding dimension: {}", vectors[0].len()),
            Err(e) => panic!("Failed to reach Ollama embeddings: {}", e),
        }

        let request = GenerationRequest::new(vec![ChatMessage::user("Say hello")]);
        match providers.generator.generate(&request).await {
            Ok(response) => println!("Ollama Chat Response: {}", response),
            Err(e) => println!("Ollama Chat Error: {}", e),
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_lmstudio_connection() {
        let config = LlmConfig {
            provider: ProviderKind::OpenaiCompatible,
            base_url: "http://localhost:1234".to_string(),
            ..LlmConfig::default()
        };
        let providers = build_providers(&config).expect("providers");

        let request = GenerationRequest::new(vec![ChatMessage::user("Hello")]);
        match providers.generator.generate(&request).await {
            Ok(response) => println!("LM Studio Chat Response: {}", response),
            Err(e) => panic!("Failed to connect to LM Studio: {}", e),
        }
    }
}

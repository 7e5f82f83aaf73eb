#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vehicle_rag::llm::{
    EmbeddingProvider, GenerationProvider, GenerationRequest, Providers, ServiceError,
};

pub const DIMENSION: usize = 64;

pub const MAPPING_CSV: &str = "\
vdatModelId,vdatMakeName,vdatModelName,coxMakeName,coxMakeCode,coxModelName,coxModelCode,coxTrimName,coxTrimCode,coxFuelTypeCode,coxFuelTypeName,Needs Bodystyle,Needs Fuel Type,Map to Multiple Cox Models,Map to Multiple Cox Trims,coxSeriesName,coxSeriesCode,coxBodyStyleName,coxBodyStyleCode
audi_a3,Audi,A3,Audi,AUD,A3,A3,Premium,PRM,GAS,Gasoline,,,,Yes,A3,A3S,Sedan,SED
audi_a3,Audi,A3,Audi,AUD,A3,A3,Premium Plus,PRP,GAS,Gasoline,,,,Yes,A3,A3S,Sedan,SED
audi_a3,Audi,A3,Audi,AUD,A3,A3,Premium,PRM,GAS,Gasoline,,,,Yes,A3,A3S,Convertible,CNV
bmw_m5-touring,BMW,M5 Touring,BMW,BMW,M5,M5,Base,BSE,GAS,Gasoline,Yes,,,,M5,M5S,Wagon,WGN
tesla_model-3,Tesla,Model 3,Tesla,TSL,Model 3,M3,Long Range,LR,ELE,Electric,,Yes,,,Model 3,M3S,Sedan,SED
";

/// Bag-of-words embedder: each lowercase token bumps one hashed dimension.
pub struct HashingEmbedder;

impl HashingEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; DIMENSION];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = token
                .to_lowercase()
                .bytes()
                .fold(2166136261u32, |acc, b| (acc ^ b as u32).wrapping_mul(16777619));
            vector[hash as usize % DIMENSION] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        Ok(inputs.iter().map(|text| Self::vector(text)).collect())
    }
}

/// Echoes the user turn back and keeps every request it saw.
#[derive(Default)]
pub struct EchoGenerator {
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl EchoGenerator {
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationProvider for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        let user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(format!("  {}  ", user))
    }
}

/// Embedding service that is down.
pub struct UnreachableEmbedder;

#[async_trait]
impl EmbeddingProvider for UnreachableEmbedder {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn embed(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        Err(ServiceError::Unreachable("connection refused".to_string()))
    }
}

pub fn fake_providers() -> (Providers, Arc<EchoGenerator>) {
    let generator = Arc::new(EchoGenerator::default());
    let providers = Providers {
        embedder: Arc::new(HashingEmbedder),
        generator: generator.clone(),
    };
    (providers, generator)
}

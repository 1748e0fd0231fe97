use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::EmbeddingConfig;
use crate::errors::ChatError;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ChatError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> usize;
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

/// REST client for the hosted embeddings endpoint.
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, model: String) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ChatError::Embedding(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            api_base: "https://api.openai.com/v1".to_string(),
            model,
            dimension: 1536,
        })
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    async fn call_api(&self, input: Value, expected: usize) -> Result<Vec<Vec<f32>>, ChatError> {
        let url = format!("{}/embeddings", self.api_base);
        let payload = json!({
            "model": self.model,
            "input": input,
            "encoding_format": "float"
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChatError::Embedding(format!("embedding request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ChatError::Embedding(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ChatError::Embedding(format!(
                "embedding API error ({}): {}",
                status, response_text
            )));
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&response_text)
            .map_err(|e| ChatError::Embedding(format!("failed to parse response: {}", e)))?;

        let embeddings: Vec<Vec<f32>> = parsed.data.into_iter().map(|item| item.embedding).collect();

        if embeddings.len() != expected {
            return Err(ChatError::Embedding(format!(
                "mismatch between input texts ({}) and returned embeddings ({})",
                expected,
                embeddings.len()
            )));
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::Embedding("cannot embed empty text".to_string()));
        }

        let mut embeddings = self.call_api(json!(text), 1).await?;
        Ok(embeddings.remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ChatError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|text| text.trim().is_empty()) {
            return Err(ChatError::Embedding("cannot embed empty text".to_string()));
        }

        self.call_api(json!(texts), texts.len()).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Deterministic hash-based embedder for offline tests: identical texts map
/// to identical unit vectors.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self { dimension: 384 }
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatError> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let hash = hasher.finish();

        let mut embedding = vec![0.0; self.dimension];
        for (i, value) in embedding.iter_mut().enumerate() {
            let seed = hash.wrapping_add(i as u64).wrapping_mul(6364136223846793005);
            *value = ((seed % 1000) as f32 - 500.0) / 500.0;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Builds the embedding client from configuration.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, ChatError> {
    let api_key = config.auth.resolve()?;
    let embedder =
        OpenAiEmbedder::new(api_key, config.model.clone())?.with_dimension(config.dimension);
    Ok(Arc::new(embedder))
}

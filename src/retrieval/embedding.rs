//! Embedding computation behind a trait seam
//!
//! Production embeds through the model server's embeddings endpoint; tests
//! plug in a deterministic local embedder.

use crate::errors::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Text-to-vector embedding engine
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed multiple texts, one vector per input in order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embedder backed by the Ollama embeddings API
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(PipelineError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "model": self.model, "prompt": text }))
            .send()
            .await
            .map_err(|e| PipelineError::Embedding(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(PipelineError::Embedding(format!(
                "embedding API returned HTTP {}",
                response.status()
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Embedding(format!("bad response body: {e}")))?;

        if parsed.embedding.is_empty() {
            return Err(PipelineError::Embedding(
                "embedding API returned an empty vector".to_string(),
            ));
        }

        Ok(parsed.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:11434", "nomic-embed-text");
        assert!(embedder.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_embedding_error() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:1", "nomic-embed-text").unwrap();
        let result = embedder.embed("hello").await;
        assert!(matches!(result, Err(PipelineError::Embedding(_))));
    }
}

/// Embedding provider trait and hosted OpenAI implementation
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::openai::{OpenAiClient, ProviderError};

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Provider request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Embedding generation failed: {0}")]
    GenerationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Trait for embedding providers
///
/// One vector per input text, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for multiple texts in one round-trip
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::GenerationError("No embeddings generated".to_string()))
    }

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Embeddings served by the OpenAI `/embeddings` endpoint
pub struct OpenAiEmbeddings {
    client: OpenAiClient,
    model_name: String,
    dimension: usize,
}

impl OpenAiEmbeddings {
    pub fn new(client: OpenAiClient, model_name: impl Into<String>, dimension: usize) -> Self {
        Self {
            client,
            model_name: model_name.into(),
            dimension,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        if texts.iter().any(|t| t.is_empty()) {
            return Err(EmbeddingError::InvalidInput("Empty text".to_string()));
        }

        let request = EmbeddingRequest {
            model: &self.model_name,
            input: texts,
        };

        let response: EmbeddingResponse = self.client.post_json("embeddings", &request).await?;

        tracing::debug!(
            "Embedded {} texts with {}",
            response.data.len(),
            self.model_name
        );

        order_embeddings(response.data, texts.len(), self.dimension)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Restore input order from the provider's `index` field and verify shape
fn order_embeddings(
    mut data: Vec<EmbeddingData>,
    expected: usize,
    dimension: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if data.len() != expected {
        return Err(EmbeddingError::GenerationError(format!(
            "Embedding count mismatch: expected {}, got {}",
            expected,
            data.len()
        )));
    }

    data.sort_by_key(|d| d.index);

    for (position, item) in data.iter().enumerate() {
        if item.index != position {
            return Err(EmbeddingError::GenerationError(format!(
                "Missing embedding for input {}",
                position
            )));
        }
        if item.embedding.len() != dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimension,
                actual: item.embedding.len(),
            });
        }
    }

    Ok(data.into_iter().map(|d| d.embedding).collect())
}

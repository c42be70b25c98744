/// Batch ingestion: embed chunks and store them in the vector collection
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info};

use super::chunker::{chunk_text, Chunk, ChunkConfig};
use super::pdf;
use super::retry::{retry_with_backoff, RetryPolicy};
use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::error::{HrqaError, Result};
use crate::store::{ChunkRecord, VectorStore};

/// Result of one document ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub chunks: usize,
    pub batches: usize,
    pub stored: usize,
    pub duration_ms: u64,
}

/// Turns documents into stored, embedded chunks
///
/// Batches run one after another. Each batch makes a single embedding call
/// and an insert that is retried under `retry`; a batch that exhausts its
/// retries aborts the whole ingestion.
pub struct Ingestor {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    chunking: ChunkConfig,
    batch_size: usize,
    retry: RetryPolicy,
}

impl Ingestor {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        chunking: ChunkConfig,
        batch_size: usize,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            embedder,
            store,
            chunking,
            batch_size: batch_size.max(1),
            retry,
        }
    }

    pub fn from_config(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: &Config,
    ) -> Result<Self> {
        Ok(Self::new(
            embedder,
            store,
            ChunkConfig::try_from(&config.chunking)?,
            config.ingest.batch_size,
            RetryPolicy::from(&config.ingest),
        ))
    }

    /// Extract, chunk, embed and store a PDF
    pub async fn ingest_pdf(&self, pdf_bytes: &[u8]) -> Result<IngestReport> {
        let text = pdf::extract_text(pdf_bytes)?;
        debug!("Extracted {} characters", text.chars().count());
        self.ingest_text(&text).await
    }

    /// Chunk, embed and store already-extracted text
    pub async fn ingest_text(&self, text: &str) -> Result<IngestReport> {
        let chunks = chunk_text(text, &self.chunking);
        if chunks.is_empty() {
            return Err(HrqaError::NoChunks);
        }
        self.store_chunks(&chunks).await
    }

    /// Embed and insert chunks batch by batch
    pub async fn store_chunks(&self, chunks: &[Chunk]) -> Result<IngestReport> {
        if chunks.is_empty() {
            return Err(HrqaError::NoChunks);
        }

        let start = Instant::now();
        let mut stored = 0;
        let mut batches = 0;

        info!(
            "Ingesting {} chunks in batches of {}",
            chunks.len(),
            self.batch_size
        );

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();

            let vectors = self.embedder.embed_batch(&texts).await.map_err(|e| {
                error!("Embedding batch failed (size={}): {}", batch.len(), e);
                e
            })?;

            let records: Vec<ChunkRecord> = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, vector)| ChunkRecord {
                    text: chunk.text.clone(),
                    page: chunk.index as i64,
                    vector,
                })
                .collect();

            let store = &self.store;
            let records = &records;
            stored += retry_with_backoff(&self.retry, "Insert batch", move |_attempt| {
                store.insert_batch(records)
            })
            .await?;

            batches += 1;
            debug!("Stored batch {} ({} records)", batches, records.len());
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!("Inserted {} chunks in {}ms", stored, duration_ms);

        Ok(IngestReport {
            chunks: chunks.len(),
            batches,
            stored,
            duration_ms,
        })
    }
}

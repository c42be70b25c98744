//! Vector store boundary
//!
//! One collection per deployment holds every chunk with its externally
//! supplied vector. Startup uses the additive `ensure_schema`; wiping the
//! collection is only possible through the explicit `reset_collection`.

mod weaviate;

pub use weaviate::WeaviateStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed")]
    AuthFailed,

    #[error("Store not ready: {0}")]
    NotReady(String),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Insert errors ({failed} objects): {messages:?}")]
    Insert { failed: usize, messages: Vec<String> },

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// One stored record: properties plus its vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub text: String,
    /// Sequential position of the chunk within its document
    pub page: i64,
    pub vector: Vec<f32>,
}

/// A hybrid search hit, valid for a single request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub page: Option<i64>,
    pub distance: Option<f32>,
    pub score: Option<f32>,
}

impl Candidate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page: None,
            distance: None,
            score: None,
        }
    }
}

/// Combined keyword + vector query
#[derive(Debug, Clone, Copy)]
pub struct HybridQuery<'a> {
    pub text: &'a str,
    pub vector: &'a [f32],
    /// 0.0 is pure keyword, 1.0 is pure vector
    pub alpha: f32,
    pub limit: usize,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Name of the collection this handle operates on
    fn collection(&self) -> &str;

    async fn collection_exists(&self) -> std::result::Result<bool, StoreError>;

    /// Create the collection: cosine distance, caller-supplied vectors
    async fn create_collection(&self) -> std::result::Result<(), StoreError>;

    async fn delete_collection(&self) -> std::result::Result<(), StoreError>;

    /// Insert all records or fail; returns the number stored
    async fn insert_batch(&self, records: &[ChunkRecord]) -> std::result::Result<usize, StoreError>;

    /// Up to `limit` candidates in the store's native ranking
    async fn hybrid_query(
        &self,
        query: &HybridQuery<'_>,
    ) -> std::result::Result<Vec<Candidate>, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    Existing,
    Created,
}

/// Create the collection once; never deletes data
pub async fn ensure_schema(
    store: &dyn VectorStore,
    embedder: &dyn EmbeddingProvider,
) -> Result<SchemaStatus> {
    if store.collection_exists().await? {
        tracing::info!("Collection '{}' exists", store.collection());
        return Ok(SchemaStatus::Existing);
    }

    // Not enforced by the schema; surfaces a misconfigured model early
    let dims = embedder.embed("dimension check").await?.len();
    if dims == embedder.dimension() {
        tracing::info!(
            "Embedding dims for {} (sanity check only): {}",
            embedder.model_name(),
            dims
        );
    } else {
        tracing::warn!(
            "{} returned {} dims but {} are configured",
            embedder.model_name(),
            dims,
            embedder.dimension()
        );
    }

    store.create_collection().await?;
    tracing::info!(
        "Created collection '{}' (external vectors, cosine)",
        store.collection()
    );

    Ok(SchemaStatus::Created)
}

/// Delete every record and recreate an empty collection
pub async fn reset_collection(store: &dyn VectorStore) -> Result<()> {
    if store.collection_exists().await? {
        store.delete_collection().await?;
        tracing::warn!("Deleted collection '{}'", store.collection());
    }

    store.create_collection().await?;
    tracing::info!("Recreated empty collection '{}'", store.collection());

    Ok(())
}

//! Owned service context
//!
//! Connections are opened once at start and released when the context is
//! dropped. A store that cannot be reached at start leaves the context in
//! degraded mode, where every data operation fails with `NotConnected`.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Config, Credentials};
use crate::embedding::{EmbeddingProvider, OpenAiEmbeddings};
use crate::error::{ErrorKind, HrqaError, Result};
use crate::ingest::{IngestReport, Ingestor};
use crate::llm::{ChatModel, OpenAiChat};
use crate::openai::OpenAiClient;
use crate::retrieval::{Answer, QaPipeline};
use crate::store::{ensure_schema, reset_collection, VectorStore, WeaviateStore};

/// Connected ingestion and query components sharing one store handle
pub struct Services {
    store: Arc<dyn VectorStore>,
    ingestor: Ingestor,
    pipeline: QaPipeline,
}

impl Services {
    /// Assemble services from already-connected components
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatModel>,
        store: Arc<dyn VectorStore>,
        config: &Config,
    ) -> Result<Self> {
        let ingestor = Ingestor::from_config(embedder.clone(), store.clone(), config)?;
        let pipeline = QaPipeline::from_config(embedder, chat, store.clone(), config);

        Ok(Self {
            store,
            ingestor,
            pipeline,
        })
    }

    /// Open provider and store connections and make sure the collection exists
    pub async fn connect(config: &Config, credentials: &Credentials) -> Result<Self> {
        let client = OpenAiClient::new(&config.openai, credentials.openai_api_key.as_str())
            .map_err(|e| HrqaError::Config(format!("OpenAI client: {}", e)))?;

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbeddings::new(
            client.clone(),
            config.embedding.model.as_str(),
            config.embedding.dimensions,
        ));
        let chat: Arc<dyn ChatModel> = Arc::new(OpenAiChat::new(client));

        let store: Arc<dyn VectorStore> = Arc::new(
            WeaviateStore::connect(
                &config.weaviate,
                &credentials.weaviate_url,
                &credentials.weaviate_api_key,
            )
            .await?,
        );

        ensure_schema(store.as_ref(), embedder.as_ref()).await?;

        Self::new(embedder, chat, store, config)
    }

    pub async fn ingest_pdf(&self, pdf_bytes: &[u8]) -> Result<IngestReport> {
        self.ingestor.ingest_pdf(pdf_bytes).await
    }

    pub async fn ask(&self, question: &str) -> Result<Answer> {
        self.pipeline.answer(question).await
    }

    /// Drop every stored chunk and recreate the empty collection
    pub async fn reset(&self) -> Result<()> {
        reset_collection(self.store.as_ref()).await
    }
}

/// Shared state handed to every HTTP handler
#[derive(Clone)]
pub struct AppState {
    services: Option<Arc<Services>>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn ready(services: Services, config: &Config) -> Self {
        Self {
            services: Some(Arc::new(services)),
            upload_dir: config.server.upload_dir.clone(),
            max_upload_bytes: config.server.max_upload_bytes,
        }
    }

    pub fn degraded(config: &Config) -> Self {
        Self {
            services: None,
            upload_dir: config.server.upload_dir.clone(),
            max_upload_bytes: config.server.max_upload_bytes,
        }
    }

    /// Resolve credentials and connect. Missing credentials are fatal; an
    /// unreachable store only degrades the state.
    pub async fn start(config: &Config) -> Result<Self> {
        let credentials = Credentials::from_env(config)?;

        match Services::connect(config, &credentials).await {
            Ok(services) => Ok(Self::ready(services, config)),
            Err(e) if e.kind() == ErrorKind::Config => Err(e),
            Err(e) => {
                tracing::error!("Failed to connect to vector store: {}", e);
                tracing::warn!("Serving in degraded mode; requests will fail until restart");
                Ok(Self::degraded(config))
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.services.is_some()
    }

    pub fn services(&self) -> Result<&Services> {
        self.services.as_deref().ok_or(HrqaError::NotConnected)
    }
}

//! Shared test doubles for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use hrqa::embedding::{EmbeddingError, EmbeddingProvider};
use hrqa::llm::{ChatModel, ChatRequest, LlmError};
use hrqa::store::{Candidate, ChunkRecord, HybridQuery, StoreError, VectorStore};

pub const DIM: usize = 8;

/// Chat model that replays queued replies and records every request
#[derive(Default)]
pub struct ScriptedChat {
    replies: Mutex<VecDeque<Option<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().unwrap().push_back(Some(text.to_string()));
        self
    }

    /// Queue a failed call
    pub fn fail(self) -> Self {
        self.replies.lock().unwrap().push_back(None);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Some(text)) => Ok(text),
            _ => Err(LlmError::EmptyResponse),
        }
    }
}

/// Embedder deriving a fixed vector from the text bytes
#[derive(Default)]
pub struct HashEmbedder {
    pub fail: AtomicBool,
    reported_dimension: Option<usize>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let embedder = Self::default();
        embedder.fail.store(true, Ordering::SeqCst);
        embedder
    }

    /// Embedder whose advertised dimension differs from the vectors it returns
    pub fn reporting_dimension(dimension: usize) -> Self {
        Self {
            reported_dimension: Some(dimension),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

pub fn hash_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    for (i, b) in text.bytes().enumerate() {
        v[i % DIM] += b as f32 / 255.0;
    }
    v
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().extend(texts.iter().cloned());
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmbeddingError::GenerationError("quota exceeded".to_string()));
        }
        Ok(texts.iter().map(|t| hash_vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.reported_dimension.unwrap_or(DIM)
    }

    fn model_name(&self) -> &str {
        "hash-test"
    }
}

/// In-memory collection with scripted insert failures and search results
pub struct MemoryStore {
    exists: AtomicBool,
    records: Mutex<Vec<ChunkRecord>>,
    insert_failures: AtomicUsize,
    insert_calls: AtomicUsize,
    results: Mutex<Vec<Candidate>>,
    queries: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            exists: AtomicBool::new(false),
            records: Mutex::new(Vec::new()),
            insert_failures: AtomicUsize::new(0),
            insert_calls: AtomicUsize::new(0),
            results: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next `n` insert calls
    pub fn failing_inserts(self, n: usize) -> Self {
        self.insert_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Candidates returned by every hybrid query
    pub fn with_results(self, texts: &[&str]) -> Self {
        *self.results.lock().unwrap() = texts.iter().map(|t| Candidate::new(*t)).collect();
        self
    }

    pub fn records(&self) -> Vec<ChunkRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    fn collection(&self) -> &str {
        "TestDocument"
    }

    async fn collection_exists(&self) -> Result<bool, StoreError> {
        Ok(self.exists.load(Ordering::SeqCst))
    }

    async fn create_collection(&self) -> Result<(), StoreError> {
        self.exists.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_collection(&self) -> Result<(), StoreError> {
        self.exists.store(false, Ordering::SeqCst);
        self.records.lock().unwrap().clear();
        Ok(())
    }

    async fn insert_batch(&self, records: &[ChunkRecord]) -> Result<usize, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.insert_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.insert_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Server {
                status: 503,
                message: "temporarily unavailable".to_string(),
            });
        }

        self.records.lock().unwrap().extend(records.iter().cloned());
        Ok(records.len())
    }

    async fn hybrid_query(&self, query: &HybridQuery<'_>) -> Result<Vec<Candidate>, StoreError> {
        self.queries.lock().unwrap().push(query.text.to_string());
        let results = self.results.lock().unwrap();
        Ok(results.iter().take(query.limit).cloned().collect())
    }
}

/// Build a PDF with one page per entry; `None` pages carry no text
pub fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let operations = match page {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

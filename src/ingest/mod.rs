//! Document ingestion
//!
//! RECEIVED -> EXTRACTED -> CHUNKED -> EMBEDDED (per batch) -> STORED

mod batch;
mod chunker;
pub mod pdf;
mod retry;

pub use batch::{IngestReport, Ingestor};
pub use chunker::{chunk_text, Chunk, ChunkConfig};
pub use retry::{backoff_delay, retry_with_backoff, RetryPolicy};

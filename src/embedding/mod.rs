//! Embedding generation
//!
//! - `EmbeddingProvider` trait for abstraction over the hosted provider
//! - `OpenAiEmbeddings` batches many texts into a single request

mod provider;

pub use provider::{EmbeddingError, EmbeddingProvider, OpenAiEmbeddings};

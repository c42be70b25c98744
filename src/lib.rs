//! hrqa - HR handbook question answering
//!
//! Ingests PDF handbooks into a hosted vector store and answers questions
//! with query expansion, hybrid search, LLM reranking and answer synthesis
//! grounded in the retrieved excerpts.

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod openai;
pub mod retrieval;
pub mod server;
pub mod service;
pub mod store;

pub use error::{HrqaError, Result};

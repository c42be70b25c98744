use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::llm::LlmError;
use crate::store::StoreError;

/// Main error type for hrqa
#[derive(Error, Debug)]
pub enum HrqaError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// Required credential missing from the environment
    #[error("Missing {var} in environment variables")]
    MissingCredential { var: String },

    /// Chunk overlap must be strictly smaller than the chunk size
    #[error("Invalid chunking: overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    /// Upload request carried no file
    #[error("No file uploaded")]
    MissingFile,

    /// Upload body could not be read
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// PDF could not be parsed
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// PDF parsed but yielded no text
    #[error("PDF contains no extractable text (possibly scanned image)")]
    NoExtractableText,

    /// Chunker produced nothing to store
    #[error("No chunks produced from document")]
    NoChunks,

    /// Question was empty or whitespace
    #[error("Question cannot be empty")]
    EmptyQuestion,

    /// Embedding provider failure
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Chat-completion provider failure
    #[error("Language model failed: {0}")]
    Llm(#[from] LlmError),

    /// Vector store failure
    #[error("Vector store error: {0}")]
    Store(#[from] StoreError),

    /// Vector store connection was not established at startup
    #[error("Vector store is not connected")]
    NotConnected,

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification used at the request boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Input,
    External,
    Unavailable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Input => "input",
            ErrorKind::External => "external",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

impl HrqaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HrqaError::Config(_)
            | HrqaError::ConfigValidation { .. }
            | HrqaError::ConfigNotFound { .. }
            | HrqaError::InvalidConfigValue { .. }
            | HrqaError::MissingCredential { .. }
            | HrqaError::Toml(_)
            | HrqaError::TomlSerialization(_) => ErrorKind::Config,
            HrqaError::InvalidChunking { .. }
            | HrqaError::MissingFile
            | HrqaError::InvalidUpload(_)
            | HrqaError::InvalidPdf(_)
            | HrqaError::NoExtractableText
            | HrqaError::NoChunks
            | HrqaError::EmptyQuestion => ErrorKind::Input,
            HrqaError::Embedding(EmbeddingError::InvalidInput(_)) => ErrorKind::Input,
            HrqaError::Embedding(_) | HrqaError::Llm(_) | HrqaError::Store(_) => {
                ErrorKind::External
            }
            HrqaError::NotConnected => ErrorKind::Unavailable,
            HrqaError::Io { .. } | HrqaError::Json { .. } | HrqaError::Other(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for hrqa operations
pub type Result<T> = std::result::Result<T, HrqaError>;

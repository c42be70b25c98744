//! Sliding-window text chunker
//!
//! Windows are measured in characters, not bytes, so multi-byte text is never
//! split inside a code point.

use crate::config::ChunkingConfig;
use crate::error::{HrqaError, Result};

/// Validated window size and overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if overlap >= chunk_size {
            return Err(HrqaError::InvalidChunking {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between consecutive window starts
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl TryFrom<&ChunkingConfig> for ChunkConfig {
    type Error = HrqaError;

    fn try_from(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.overlap)
    }
}

/// A stripped window of document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position among the chunks kept for this document
    pub index: usize,
    pub text: String,
    /// Character span of the window in the source text, end exclusive
    pub start: usize,
    pub end: usize,
}

/// Split `text` into overlapping windows, dropping windows that are blank
/// once stripped. Blank input yields no chunks.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    // Byte offset of every char boundary, including the end of the string
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let len = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < len {
        let end = (start + config.chunk_size).min(len);
        let window = text[bounds[start]..bounds[end]].trim();

        if !window.is_empty() {
            chunks.push(Chunk {
                index: chunks.len(),
                text: window.to_string(),
                start,
                end,
            });
        }

        start += config.stride();
    }

    chunks
}

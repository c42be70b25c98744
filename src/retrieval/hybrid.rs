//! Hybrid (keyword + vector) search against the external store

use std::sync::Arc;

use crate::store::{Candidate, HybridQuery, StoreError, VectorStore};

/// Issues blended searches with a fixed alpha
pub struct HybridSearcher {
    store: Arc<dyn VectorStore>,
    alpha: f32,
}

impl HybridSearcher {
    pub fn new(store: Arc<dyn VectorStore>, alpha: f32) -> Self {
        Self { store, alpha }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Up to `limit` candidates in the store's ranking; empty is a valid result
    pub async fn search(
        &self,
        expanded_query: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError> {
        let query = HybridQuery {
            text: expanded_query,
            vector,
            alpha: self.alpha,
            limit,
        };

        let mut candidates = self.store.hybrid_query(&query).await?;
        candidates.truncate(limit);

        tracing::debug!(
            "Hybrid search returned {} candidates (alpha={}, limit={})",
            candidates.len(),
            self.alpha,
            limit
        );

        Ok(candidates)
    }
}

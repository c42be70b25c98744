//! Question answering flow
//!
//! RECEIVED -> EXPANDED -> EMBEDDED -> SEARCHED -> (EMPTY -> DONE)
//!                                              | RERANKED -> SYNTHESIZED -> DONE
//!
//! Expansion failures are absorbed; every later external failure ends the
//! request with an error.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::answer::{AnswerSynthesizer, NOT_FOUND_MESSAGE};
use super::expansion::QueryExpander;
use super::hybrid::HybridSearcher;
use super::reranker::LlmReranker;
use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::error::{HrqaError, Result};
use crate::llm::ChatModel;
use crate::store::VectorStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Received,
    Expanded,
    Embedded,
    Searched,
    Empty,
    Reranked,
    Synthesized,
    Done,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryStage::Received => "received",
            QueryStage::Expanded => "expanded",
            QueryStage::Embedded => "embedded",
            QueryStage::Searched => "searched",
            QueryStage::Empty => "empty",
            QueryStage::Reranked => "reranked",
            QueryStage::Synthesized => "synthesized",
            QueryStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Response to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub answer: String,
    /// False when retrieval found nothing and the model was never asked
    pub found: bool,
    /// Number of excerpts given to the model
    pub sources: usize,
}

impl Answer {
    pub fn not_found() -> Self {
        Self {
            answer: NOT_FOUND_MESSAGE.to_string(),
            found: false,
            sources: 0,
        }
    }
}

/// Retrieval settings used by the pipeline
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub search_limit: usize,
    pub context_size: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            search_limit: 12,
            context_size: 4,
        }
    }
}

pub struct QaPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    expander: QueryExpander,
    searcher: HybridSearcher,
    reranker: LlmReranker,
    synthesizer: AnswerSynthesizer,
    settings: PipelineSettings,
}

impl QaPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        expander: QueryExpander,
        searcher: HybridSearcher,
        reranker: LlmReranker,
        synthesizer: AnswerSynthesizer,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            embedder,
            expander,
            searcher,
            reranker,
            synthesizer,
            settings,
        }
    }

    /// Wire every stage from configuration
    pub fn from_config(
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatModel>,
        store: Arc<dyn VectorStore>,
        config: &Config,
    ) -> Self {
        let retrieval = &config.retrieval;
        Self::new(
            embedder,
            QueryExpander::new(chat.clone(), &config.llm.expansion_model),
            HybridSearcher::new(store, retrieval.alpha),
            LlmReranker::new(
                chat.clone(),
                &config.llm.rerank_model,
                retrieval.rerank_preview_chars,
            ),
            AnswerSynthesizer::new(chat, &config.llm.answer_model),
            PipelineSettings {
                search_limit: retrieval.search_limit,
                context_size: retrieval.context_size,
            },
        )
    }

    /// Answer a question from the stored handbook
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(HrqaError::EmptyQuestion);
        }
        trace_stage(QueryStage::Received);

        let expanded = self.expander.expand(question).await;
        trace_stage(QueryStage::Expanded);

        let vector = self.embedder.embed(&expanded).await?;
        trace_stage(QueryStage::Embedded);

        let candidates = self
            .searcher
            .search(&expanded, &vector, self.settings.search_limit)
            .await?;
        trace_stage(QueryStage::Searched);

        if candidates.is_empty() {
            trace_stage(QueryStage::Empty);
            tracing::info!("No candidates found for question");
            return Ok(Answer::not_found());
        }

        let ranked = self.reranker.rerank(question, candidates).await?;
        trace_stage(QueryStage::Reranked);

        let contexts: Vec<String> = ranked
            .into_iter()
            .take(self.settings.context_size)
            .collect();

        let answer = self.synthesizer.synthesize(question, &contexts).await?;
        trace_stage(QueryStage::Synthesized);

        trace_stage(QueryStage::Done);
        Ok(Answer {
            answer,
            found: true,
            sources: contexts.len(),
        })
    }
}

fn trace_stage(stage: QueryStage) {
    tracing::debug!(%stage, "query stage");
}

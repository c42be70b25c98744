//! Query-side retrieval
//!
//! Query expansion, hybrid search against the external store, LLM reranking
//! and answer synthesis, composed by `QaPipeline`.

mod answer;
mod expansion;
mod hybrid;
mod pipeline;
mod reranker;

pub use answer::{
    answer_prompt, clean_answer, AnswerSynthesizer, CONTEXT_SEPARATOR, NOT_FOUND_MESSAGE,
};
pub use expansion::{expansion_prompt, QueryExpander};
pub use hybrid::HybridSearcher;
pub use pipeline::{Answer, PipelineSettings, QaPipeline, QueryStage};
pub use reranker::{build_rerank_prompt, parse_rank_order, LlmReranker};

//! LLM reranking of hybrid-search candidates

use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::llm::{ChatMessage, ChatModel, ChatRequest, LlmError};
use crate::store::Candidate;

const RERANK_SYSTEM: &str = "You are a factual and consistent reranker.";

fn index_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

/// Parse a model reply into 0-based candidate positions.
///
/// Every run of digits is read as a 1-based index, in reply order; values
/// outside `[1, count]` and repeats are dropped. Candidates the model left
/// out are not returned. Only when nothing valid parses does the result fall
/// back to the search order `0..count`.
pub fn parse_rank_order(raw: &str, count: usize) -> Vec<usize> {
    let mut seen = vec![false; count];
    let mut order = Vec::new();

    for m in index_pattern().find_iter(raw) {
        let Ok(index) = m.as_str().parse::<usize>() else {
            continue;
        };
        if (1..=count).contains(&index) && !seen[index - 1] {
            seen[index - 1] = true;
            order.push(index - 1);
        }
    }

    if order.is_empty() {
        tracing::warn!("Reranker output had no valid indices, keeping search order");
        return (0..count).collect();
    }

    order
}

/// Numbered, newline-collapsed previews of each candidate
pub fn build_rerank_prompt(question: &str, candidates: &[Candidate], preview_chars: usize) -> String {
    let excerpts: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let preview: String = c.text.chars().take(preview_chars).collect();
            format!("[{}] {}...", i + 1, preview.trim().replace('\n', " "))
        })
        .collect();

    format!(
        "You are a precise HR assistant that ranks excerpts \
from a staff handbook by how relevant they are to the user's question.
You must rank excerpts that directly answer the user's question higher than those that merely discuss related topics.

Question: {question}

Excerpts:
{excerpts}

Return only the list of excerpt numbers, separated by commas, in descending order of relevance. Example: 3, 1, 2
",
        question = question,
        excerpts = excerpts.join("\n\n"),
    )
}

/// Asks a chat model to order candidates by relevance
pub struct LlmReranker {
    chat: Arc<dyn ChatModel>,
    model: String,
    preview_chars: usize,
}

impl LlmReranker {
    pub fn new(chat: Arc<dyn ChatModel>, model: impl Into<String>, preview_chars: usize) -> Self {
        Self {
            chat,
            model: model.into(),
            preview_chars,
        }
    }

    /// Texts of the candidates the model ranked, most relevant first. An
    /// empty list never reaches the model; an unparsable reply keeps the
    /// search order.
    pub async fn rerank(
        &self,
        question: &str,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<String>, LlmError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let request = ChatRequest::new(&self.model, 0.0)
            .message(ChatMessage::system(RERANK_SYSTEM))
            .message(ChatMessage::user(build_rerank_prompt(
                question,
                &candidates,
                self.preview_chars,
            )));

        let raw = self.chat.complete(request).await?;
        tracing::debug!("Reranker raw output: {}", raw);

        let order = parse_rank_order(&raw, candidates.len());

        let mut slots: Vec<Option<String>> = candidates.into_iter().map(|c| Some(c.text)).collect();
        Ok(order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_permutation() {
        assert_eq!(parse_rank_order("3, 1, 2", 3), vec![2, 0, 1]);
        assert_eq!(parse_rank_order("3,1,2", 3), vec![2, 0, 1]);
    }

    #[test]
    fn test_parse_malformed_keeps_order() {
        assert_eq!(parse_rank_order("abc", 3), vec![0, 1, 2]);
        assert_eq!(parse_rank_order("", 2), vec![0, 1]);
    }

    #[test]
    fn test_parse_out_of_range_keeps_order() {
        assert_eq!(parse_rank_order("9,9", 3), vec![0, 1, 2]);
        assert_eq!(parse_rank_order("0", 2), vec![0, 1]);
    }

    #[test]
    fn test_parse_keeps_only_listed_indices() {
        assert_eq!(parse_rank_order("2", 3), vec![1]);
        assert_eq!(parse_rank_order("2,2", 3), vec![1]);
        assert_eq!(parse_rank_order("Ranking: [2], then 7, then 4", 4), vec![1, 3]);
    }

    #[test]
    fn test_parse_overflowing_number_ignored() {
        let raw = "99999999999999999999999999, 2";
        assert_eq!(parse_rank_order(raw, 2), vec![1]);
    }

    #[test]
    fn test_parse_zero_candidates() {
        assert!(parse_rank_order("1, 2", 0).is_empty());
    }

    #[test]
    fn test_prompt_previews_are_truncated_and_flattened() {
        let long = format!("line one\nline two {}", "x".repeat(1000));
        let candidates = vec![Candidate::new(long), Candidate::new("short")];

        let prompt = build_rerank_prompt("How much leave?", &candidates, 400);

        assert!(prompt.contains("Question: How much leave?"));
        assert!(prompt.contains("[1] line one line two "));
        assert!(prompt.contains("[2] short..."));
        assert!(!prompt.contains(&"x".repeat(400)));
    }
}

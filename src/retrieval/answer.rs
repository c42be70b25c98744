//! Answer synthesis constrained to retrieved context

use std::sync::Arc;

use crate::llm::{ChatMessage, ChatModel, ChatRequest, LlmError};

/// Returned without calling the model when retrieval found nothing
pub const NOT_FOUND_MESSAGE: &str =
    "I couldn't find anything relevant to your question in the uploaded handbook.";

/// Separator placed between context excerpts
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

const ANSWER_SYSTEM: &str = "You are a helpful HR assistant. \
Base your answer only on the handbook excerpts provided. \
If the information is unclear, infer carefully but prefer quoting exact text.";

const QUOTE_CHARS: [char; 6] = ['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

pub fn answer_prompt(question: &str, contexts: &[String]) -> String {
    format!(
        "You are an HR assistant answering questions from the staff handbook.
Use only the following content to answer accurately and concisely:

{context}

Question: {question}
Answer:
",
        context = contexts.join(CONTEXT_SEPARATOR),
        question = question,
    )
}

/// Remove one wrapping quote character from each end; the interior is kept
pub fn clean_answer(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix(&QUOTE_CHARS[..]).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(&QUOTE_CHARS[..]).unwrap_or(trimmed);
    trimmed.trim().to_string()
}

/// Final LLM call producing the user-facing answer
pub struct AnswerSynthesizer {
    chat: Arc<dyn ChatModel>,
    model: String,
}

impl AnswerSynthesizer {
    pub fn new(chat: Arc<dyn ChatModel>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    pub async fn synthesize(&self, question: &str, contexts: &[String]) -> Result<String, LlmError> {
        let request = ChatRequest::new(&self.model, 0.0)
            .message(ChatMessage::system(ANSWER_SYSTEM))
            .message(ChatMessage::user(answer_prompt(question, contexts)));

        let raw = self.chat.complete(request).await?;
        Ok(clean_answer(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_outer_quotes_only() {
        assert_eq!(clean_answer(r#""Hello "world"""#), r#"Hello "world""#);
    }

    #[test]
    fn test_clean_curly_quotes() {
        assert_eq!(clean_answer("\u{201C}Contact your line manager.\u{201D}"), "Contact your line manager.");
        assert_eq!(clean_answer("\u{2018}Yes\u{2019}"), "Yes");
    }

    #[test]
    fn test_clean_leaves_unquoted_text() {
        assert_eq!(clean_answer("  Staff get 25 days.  "), "Staff get 25 days.");
        assert_eq!(clean_answer(r#"The "core hours" rule"#), r#"The "core hours" rule"#);
    }

    #[test]
    fn test_clean_single_side() {
        assert_eq!(clean_answer("\"Leading only"), "Leading only");
        assert_eq!(clean_answer("Trailing only\""), "Trailing only");
    }

    #[test]
    fn test_prompt_joins_context_with_separator() {
        let contexts = vec!["first excerpt".to_string(), "second excerpt".to_string()];
        let prompt = answer_prompt("Who do I call?", &contexts);
        assert!(prompt.contains("first excerpt\n\n---\n\nsecond excerpt"));
        assert!(prompt.ends_with("Question: Who do I call?\nAnswer:\n"));
    }
}

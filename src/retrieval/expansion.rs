//! Query expansion: rewrite a short question into a synonym-rich search query

use std::sync::Arc;

use crate::llm::{ChatMessage, ChatModel, ChatRequest};

const EXPANSION_PROMPT: &str = "\
Expand the following short questions into a more detailed search query
that includes synonyms and related HR terms, but also restate the keywords clearly.

Examples:

Q: Who should I contact if I am sick?
Expanded: Who should I notify or contact if I am ill, unwell, or absent due to sickness - such as my Deputy Head or line manager.

Q: What do I do if I am late?
Expanded: What procedure should I follow if I expect to be late, delayed, or absent for work - who must I contact, for example my Deputy Head or line manager?

Now expand this query in the same way:
Q: {query}
Expanded:
";

pub fn expansion_prompt(query: &str) -> String {
    EXPANSION_PROMPT.replace("{query}", query)
}

/// Few-shot LLM query expansion that never fails
pub struct QueryExpander {
    chat: Arc<dyn ChatModel>,
    model: String,
}

impl QueryExpander {
    pub fn new(chat: Arc<dyn ChatModel>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    /// Expanded query, or `query` unchanged if the model call fails or
    /// returns nothing
    pub async fn expand(&self, query: &str) -> String {
        let request = ChatRequest::new(&self.model, 0.0).message(ChatMessage::user(expansion_prompt(query)));

        match self.chat.complete(request).await {
            Ok(expanded) if !expanded.trim().is_empty() => {
                tracing::debug!("Expanded query: {}", expanded);
                expanded.trim().to_string()
            }
            Ok(_) => {
                tracing::warn!("Query expansion returned empty text, using original query");
                query.to_string()
            }
            Err(e) => {
                tracing::warn!("Query expansion failed: {}", e);
                query.to_string()
            }
        }
    }
}

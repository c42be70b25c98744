//! Chat-completion boundary
//!
//! Requests are an ordered list of role-tagged messages plus a model
//! identifier and temperature; the reply is a single text completion.

mod openai;

pub use openai::OpenAiChat;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::openai::ProviderError;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Provider request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Model returned no content")]
    EmptyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature,
        }
    }

    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }
}

/// Hosted chat model
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion and return the trimmed text of the first choice
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_roles_lowercase() {
        let request = ChatRequest::new("gpt-4o-mini", 0.0)
            .message(ChatMessage::system("be brief"))
            .message(ChatMessage::user("hi"));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["temperature"], 0.0);
    }
}

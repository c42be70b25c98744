use async_trait::async_trait;
use serde::Deserialize;

use super::{ChatModel, ChatRequest, LlmError};
use crate::openai::OpenAiClient;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat completions served by the OpenAI `/chat/completions` endpoint
pub struct OpenAiChat {
    client: OpenAiClient,
}

impl OpenAiChat {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        let response: CompletionResponse =
            self.client.post_json("chat/completions", &request).await?;
        first_choice_text(response)
    }
}

fn first_choice_text(response: CompletionResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .ok_or(LlmError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_choice_trimmed() {
        let json = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  3, 1, 2\n"}}]}"#;
        let response: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(first_choice_text(response).unwrap(), "3, 1, 2");
    }

    #[test]
    fn test_null_content_is_empty_response() {
        let json = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":null}}]}"#;
        let response: CompletionResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            first_choice_text(response),
            Err(LlmError::EmptyResponse)
        ));
    }
}

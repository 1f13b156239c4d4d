//! Client for DeepSeek-compatible chat completion endpoints.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::types::MessageRole;

/// One role-tagged message in a conversation history.
///
/// Matches the wire shape of the chat completion `messages` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

pub struct CompletionClient {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl CompletionClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client: reqwest::Client::new(),
        }
    }

    /// Request a completion for the full accumulated history.
    ///
    /// Returns the trimmed text of the first choice.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!(
            "Sending completion request with {} messages",
            messages.len()
        );

        let request = CompletionRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(BotError::Api { status, message });
        }

        let api_response: CompletionResponse = response.json().await?;

        let reply = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BotError::Response("No choices in response".to_string()))?
            .message
            .content;

        debug!("Received completion response");
        Ok(reply.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_matches_wire_schema() {
        let messages = vec![
            ChatMessage::new(MessageRole::System, "be brief"),
            ChatMessage::new(MessageRole::User, "hi"),
        ];
        let request = CompletionRequest {
            model: "deepseek-chat",
            messages: &messages,
            stream: false,
        };

        let value = serde_json::to_value(&request).expect("request serializes");
        assert_eq!(
            value,
            json!({
                "model": "deepseek-chat",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"},
                ],
                "stream": false,
            })
        );
    }

    #[test]
    fn response_extracts_first_choice() {
        let raw = json!({
            "id": "cmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "  hello  "}},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}},
            ],
            "usage": {"total_tokens": 7},
        });

        let parsed: CompletionResponse = serde_json::from_value(raw).expect("response parses");
        assert_eq!(parsed.choices[0].message.content.trim(), "hello");
    }

    #[test]
    fn response_without_choices_parses_empty() {
        let parsed: CompletionResponse =
            serde_json::from_str(r#"{"choices": []}"#).expect("response parses");
        assert!(parsed.choices.is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client = CompletionClient::new(
            "key".to_string(),
            "https://api.example.com/".to_string(),
            "model".to_string(),
        );
        assert_eq!(client.base_url, "https://api.example.com");
    }
}

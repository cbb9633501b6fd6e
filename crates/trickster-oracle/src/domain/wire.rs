//! Chat-completions wire format.

use serde::{Deserialize, Serialize};

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`.
    pub role: String,
    /// Message text. Some providers send `null` for empty replies.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    /// A user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            content: Some(content.into()),
        }
    }
}

/// Requested output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseFormat {
    /// `json_object` for structured replies.
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ResponseFormat {
    /// Ask for a single JSON object.
    pub const JSON_OBJECT: Self = Self {
        kind: "json_object",
    };
}

/// Request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,
    /// Output format constraint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Response body. Only the fields the game reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Candidate replies.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One candidate reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The reply message.
    pub message: ChatMessage,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any choice came back.
    ///
    /// A choice with `null` content reads as the empty string.
    #[must_use]
    pub fn into_first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
    }
}

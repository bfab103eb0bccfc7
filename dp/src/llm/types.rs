//! LLM request/response types

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation messages (one user message for itinerary prompts)
    pub messages: Vec<Message>,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Max tokens for response; provider default when None
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// A request carrying a single user message
    pub fn user_prompt(prompt: impl Into<String>) -> Self {
        debug!("CompletionRequest::user_prompt: called");
        Self {
            messages: vec![Message::user(prompt)],
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message with text content
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
        }
    }
}

/// Response from an LLM completion
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content of the first choice
    pub content: Option<String>,

    /// Why the model stopped
    pub stop_reason: StopReason,

    /// Token usage statistics
    pub usage: TokenUsage,
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Natural end of response
    EndTurn,
    /// Hit max_tokens limit
    MaxTokens,
    /// Blocked by the provider's content filter
    ContentFilter,
}

/// Token usage for a completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_builder() {
        let req = CompletionRequest::user_prompt("plan a date")
            .with_temperature(0.7)
            .with_max_tokens(Some(500));

        assert_eq!(req.messages, vec![Message::user("plan a date")]);
        assert_eq!(req.temperature, Some(0.7));
        assert_eq!(req.max_tokens, Some(500));
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            input_tokens: 1200,
            output_tokens: 300,
        };
        assert_eq!(usage.total(), 1500);
    }
}

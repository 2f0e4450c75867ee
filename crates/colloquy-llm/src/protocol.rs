//! Wire types for the chat-completions, tokenizer and model-listing
//! endpoints.

use colloquy_core::{Message, ToolSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LLMError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: Message,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// The parts of a completion response a session acts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub message: Message,
    pub total_tokens: Option<u64>,
}

impl ChatCompletionResponse {
    pub fn into_completion(self) -> Result<Completion> {
        let total_tokens = self.usage.and_then(|usage| usage.total_tokens);
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::Protocol("response carried no choices".to_string()))?;
        Ok(Completion {
            message: choice.message,
            total_tokens,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TokenizerRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
pub struct TokenizerResponse {
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl TokenizerResponse {
    pub fn prompt_tokens(&self) -> Option<u64> {
        self.usage.as_ref().and_then(|usage| usage.prompt_tokens)
    }
}

/// Model identifiers from a model-listing response. Handles both the
/// OpenAI shape (`data[].id`) and the Gemini shape (`models[].name`).
pub fn model_ids(listing: &Value) -> Vec<String> {
    let from = |key: &str, field: &str| -> Option<Vec<String>> {
        listing.get(key)?.as_array().map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(field)?.as_str().map(str::to_string))
                .collect()
        })
    };

    from("data", "id")
        .or_else(|| from("models", "name"))
        .unwrap_or_default()
}

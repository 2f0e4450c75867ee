//! In-process stand-ins for the completion endpoint and the tokenizer.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use colloquy_core::{AsyncTokenOracle, Message, OracleResult, TokenOracle, ToolCall};
use colloquy_llm::{
    BlockingCompletionBackend, ChatCompletionRequest, Completion, CompletionBackend, ErrorBody,
    LLMError, Result,
};

/// Replays queued replies in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<Completion>>>,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, text: &str, total_tokens: Option<u64>) {
        self.push(Ok(Completion {
            message: Message::assistant(text, None),
            total_tokens,
        }));
    }

    pub fn reply_with_tools(&self, calls: Vec<ToolCall>, total_tokens: Option<u64>) {
        self.push(Ok(Completion {
            message: Message::assistant("", Some(calls)),
            total_tokens,
        }));
    }

    pub fn reject(&self, status: u16, body: &str) {
        self.push(Err(LLMError::Api {
            status,
            body: ErrorBody::decode(body.to_string()),
        }));
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, reply: Result<Completion>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    fn next(&self, request: &ChatCompletionRequest) -> Result<Completion> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LLMError::Protocol("no scripted reply left".to_string())))
    }
}

impl BlockingCompletionBackend for ScriptedBackend {
    fn complete(&self, request: &ChatCompletionRequest) -> Result<Completion> {
        self.next(request)
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<Completion> {
        self.next(request)
    }
}

/// Charges a fixed number of tokens per message.
pub struct PerMessageOracle(pub u64);

impl TokenOracle for PerMessageOracle {
    fn count_tokens(&self, messages: &[Message]) -> OracleResult<u64> {
        Ok(messages.len() as u64 * self.0)
    }
}

#[async_trait]
impl AsyncTokenOracle for PerMessageOracle {
    async fn count_tokens(&self, messages: &[Message]) -> OracleResult<u64> {
        Ok(messages.len() as u64 * self.0)
    }
}

pub fn texts(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .map(|m| m.text().unwrap_or_default().into_owned())
        .collect()
}

pub fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCall {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "type": "function",
        "function": {"name": name, "arguments": arguments}
    }))
    .unwrap()
}

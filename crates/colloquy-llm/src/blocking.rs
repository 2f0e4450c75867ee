use colloquy_core::{Message, OracleError, OracleResult, TokenOracle};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::http::{blocking_client, completion_from_body, json_from_body, tokens_from_body};
use crate::protocol::{ChatCompletionRequest, Completion, TokenizerRequest};
use crate::provider::BlockingCompletionBackend;

/// Thread-blocking counterpart of [`HttpCompletionClient`](crate::HttpCompletionClient).
///
/// Must not be created or dropped from inside an async runtime.
#[derive(Debug, Clone)]
pub struct BlockingCompletionClient {
    client: Client,
    completions_url: String,
    tokenizer_url: String,
    tokenizer_model: String,
    models_url: String,
}

impl BlockingCompletionClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: blocking_client(config)?,
            completions_url: config.completions_url(),
            tokenizer_url: config.tokenizer_endpoint(),
            tokenizer_model: config.tokenizer_model.clone(),
            models_url: config.models_url(),
        })
    }

    pub fn list_models(&self) -> Result<Value> {
        log::debug!("GET {}", self.models_url);
        let response = self.client.get(&self.models_url).send()?;
        let status = response.status();
        let text = response.text()?;
        json_from_body(status, text)
    }
}

impl BlockingCompletionBackend for BlockingCompletionClient {
    fn complete(&self, request: &ChatCompletionRequest) -> Result<Completion> {
        log::info!(
            "POST {} model={} messages={} tools={}",
            self.completions_url,
            request.model,
            request.messages.len(),
            request.tools.len()
        );
        let response = self.client.post(&self.completions_url).json(request).send()?;
        let status = response.status();
        let text = response.text()?;
        log::debug!("Completion responded {} ({} bytes)", status, text.len());
        completion_from_body(status, text)
    }
}

impl TokenOracle for BlockingCompletionClient {
    fn count_tokens(&self, messages: &[Message]) -> OracleResult<u64> {
        let payload = TokenizerRequest {
            model: &self.tokenizer_model,
            messages,
        };
        let response = self
            .client
            .post(&self.tokenizer_url)
            .json(&payload)
            .send()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        tokens_from_body(status, text)
    }
}

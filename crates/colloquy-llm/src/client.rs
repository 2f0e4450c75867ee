use async_trait::async_trait;
use colloquy_core::{AsyncTokenOracle, Message, OracleError, OracleResult};
use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::http::{async_client, completion_from_body, json_from_body, tokens_from_body};
use crate::protocol::{ChatCompletionRequest, Completion, TokenizerRequest};
use crate::provider::CompletionBackend;

/// Non-blocking client for the completion, tokenizer and model-listing
/// endpoints.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    client: Client,
    completions_url: String,
    tokenizer_url: String,
    tokenizer_model: String,
    models_url: String,
}

impl HttpCompletionClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: async_client(config)?,
            completions_url: config.completions_url(),
            tokenizer_url: config.tokenizer_endpoint(),
            tokenizer_model: config.tokenizer_model.clone(),
            models_url: config.models_url(),
        })
    }

    /// Raw model catalog as returned by `GET {api_base}/models`.
    pub async fn list_models(&self) -> Result<Value> {
        log::debug!("GET {}", self.models_url);
        let response = self.client.get(&self.models_url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        json_from_body(status, text)
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<Completion> {
        log::info!(
            "POST {} model={} messages={} tools={}",
            self.completions_url,
            request.model,
            request.messages.len(),
            request.tools.len()
        );
        let response = self
            .client
            .post(&self.completions_url)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        log::debug!("Completion responded {} ({} bytes)", status, text.len());
        completion_from_body(status, text)
    }
}

#[async_trait]
impl AsyncTokenOracle for HttpCompletionClient {
    async fn count_tokens(&self, messages: &[Message]) -> OracleResult<u64> {
        let payload = TokenizerRequest {
            model: &self.tokenizer_model,
            messages,
        };
        let response = self
            .client
            .post(&self.tokenizer_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        tokens_from_body(status, text)
    }
}

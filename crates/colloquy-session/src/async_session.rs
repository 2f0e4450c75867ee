use std::path::{Path, PathBuf};
use std::sync::Arc;

use colloquy_core::{
    latest_reply, latest_tool_call, AsyncTokenOracle, ConversationHistory, Message, Outgoing,
    TokenBudget, ToolCall, ToolSchema,
};
use colloquy_llm::{CompletionBackend, Config, HttpCompletionClient};
use colloquy_store::{tokio_store, AsyncConversationStore, CatalogEntry, StoreError};

use crate::error::Result;
use crate::options::SessionOptions;
use crate::turn;

/// Conversation driven from an async task. Suspends only on the completion
/// request, the tokenizer call and record I/O.
pub struct AsyncConversationSession {
    backend: Arc<dyn CompletionBackend>,
    oracle: Arc<dyn AsyncTokenOracle>,
    model: String,
    budget: TokenBudget,
    tools: Vec<ToolSchema>,
    history: ConversationHistory,
    store: Option<AsyncConversationStore>,
}

impl AsyncConversationSession {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        oracle: Arc<dyn AsyncTokenOracle>,
        options: SessionOptions,
    ) -> Self {
        let history = options.initial_history();
        Self {
            backend,
            oracle,
            model: options.model,
            budget: options.budget,
            tools: options.tools,
            history,
            store: options.storage.map(AsyncConversationStore::new),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(HttpCompletionClient::new(config)?);
        Ok(Self::new(
            client.clone(),
            client,
            SessionOptions::from_config(config),
        ))
    }

    pub fn with_tools(mut self, tools: Vec<ToolSchema>) -> Self {
        self.tools = tools;
        self
    }

    /// Send one message or a batch and return the assistant reply.
    ///
    /// The outgoing messages are recorded before the request is made and
    /// stay recorded if it fails.
    pub async fn send(&mut self, outgoing: impl Into<Outgoing>) -> Result<Message> {
        let request = turn::prepare(&mut self.history, &self.model, &self.tools, outgoing.into());
        let completion = self.backend.complete(&request).await?;
        Ok(turn::absorb(&mut self.history, completion, self.budget))
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &[Message] {
        self.history.active()
    }

    pub fn store_history(&self) -> &[Message] {
        self.history.store()
    }

    pub fn budget(&self) -> TokenBudget {
        self.budget
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tools(&self) -> &[ToolSchema] {
        &self.tools
    }

    pub fn latest_tool_call(&self, name: Option<&str>) -> Vec<ToolCall> {
        latest_tool_call(self.history.active(), name)
    }

    pub fn latest_reply(&self) -> Option<String> {
        latest_reply(self.history.active())
    }

    fn store(&self) -> Result<&AsyncConversationStore> {
        Ok(self.store.as_ref().ok_or(StoreError::NotConfigured)?)
    }

    pub async fn save(&self, id: Option<&str>) -> Result<String> {
        Ok(self.store()?.save(self.history.store(), id).await?)
    }

    pub async fn load(&mut self, id: &str) -> Result<String> {
        let messages = self.store()?.load(id).await?;
        self.history.replace(messages);
        let evicted = self
            .history
            .enforce_budget_async(self.budget, self.oracle.as_ref())
            .await;
        if evicted > 0 {
            log::info!("Evicted {} exchange(s) from restored record {}", evicted, id);
        }
        Ok(id.to_string())
    }

    pub async fn list_records(&self, root: Option<&Path>) -> Result<Vec<PathBuf>> {
        match root {
            Some(root) => Ok(tokio_store::list_records_in(root).await?),
            None => Ok(self.store()?.list_records().await?),
        }
    }

    pub async fn catalog(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.store()?.catalog().await?)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.store()?.delete(id).await?)
    }
}

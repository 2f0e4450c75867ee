use std::path::{Path, PathBuf};
use std::sync::Arc;

use colloquy_core::{
    latest_reply, latest_tool_call, ConversationHistory, Message, Outgoing, TokenBudget,
    TokenOracle, ToolCall, ToolSchema,
};
use colloquy_llm::{BlockingCompletionBackend, BlockingCompletionClient, Config};
use colloquy_store::{list_records_in, CatalogEntry, ConversationStore, StoreError};

use crate::error::Result;
use crate::options::SessionOptions;
use crate::turn;

/// Conversation driven from a thread that may block on the network.
///
/// Do not use from inside an async runtime; see
/// [`AsyncConversationSession`](crate::AsyncConversationSession).
pub struct ConversationSession {
    backend: Arc<dyn BlockingCompletionBackend>,
    oracle: Arc<dyn TokenOracle>,
    model: String,
    budget: TokenBudget,
    tools: Vec<ToolSchema>,
    history: ConversationHistory,
    store: Option<ConversationStore>,
}

impl ConversationSession {
    pub fn new(
        backend: Arc<dyn BlockingCompletionBackend>,
        oracle: Arc<dyn TokenOracle>,
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
            store: options.storage.map(ConversationStore::new),
        }
    }

    /// HTTP-backed session using `config` for both completions and token
    /// counts.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(BlockingCompletionClient::new(config)?);
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
    pub fn send(&mut self, outgoing: impl Into<Outgoing>) -> Result<Message> {
        let request = turn::prepare(&mut self.history, &self.model, &self.tools, outgoing.into());
        let completion = self.backend.complete(&request)?;
        Ok(turn::absorb(&mut self.history, completion, self.budget))
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Active history, as transmitted.
    pub fn history(&self) -> &[Message] {
        self.history.active()
    }

    /// Full history, as persisted.
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

    fn store(&self) -> Result<&ConversationStore> {
        Ok(self.store.as_ref().ok_or(StoreError::NotConfigured)?)
    }

    /// Persist the store history; returns the record id.
    pub fn save(&self, id: Option<&str>) -> Result<String> {
        Ok(self.store()?.save(self.history.store(), id)?)
    }

    /// Replace both histories with a saved record, then evict from the
    /// active history until the tokenizer reports it under budget.
    pub fn load(&mut self, id: &str) -> Result<String> {
        let messages = self.store()?.load(id)?;
        self.history.replace(messages);
        let evicted = self.history.enforce_budget(self.budget, self.oracle.as_ref());
        if evicted > 0 {
            log::info!("Evicted {} exchange(s) from restored record {}", evicted, id);
        }
        Ok(id.to_string())
    }

    /// Records under `root`, or under the configured storage directory.
    pub fn list_records(&self, root: Option<&Path>) -> Result<Vec<PathBuf>> {
        match root {
            Some(root) => Ok(list_records_in(root)?),
            None => Ok(self.store()?.list_records()?),
        }
    }

    pub fn catalog(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.store()?.catalog()?)
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.store()?.delete(id)?)
    }
}

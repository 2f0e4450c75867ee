use std::path::PathBuf;

use colloquy_core::{ConversationHistory, TokenBudget, ToolSchema};
use colloquy_llm::Config;

/// Everything a session needs besides its transport.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub model: String,
    pub budget: TokenBudget,
    pub system_prompt: Option<String>,
    pub tools: Vec<ToolSchema>,
    /// Record directory; persistence calls fail without one.
    pub storage: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            model: colloquy_llm::config::DEFAULT_MODEL.to_string(),
            budget: TokenBudget::default(),
            system_prompt: None,
            tools: Vec::new(),
            storage: None,
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            budget: config.budget(),
            system_prompt: config.system_prompt.clone(),
            tools: Vec::new(),
            storage: config.storage.clone(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_budget(mut self, budget: TokenBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolSchema>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_storage(mut self, storage: impl Into<PathBuf>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    pub(crate) fn initial_history(&self) -> ConversationHistory {
        match &self.system_prompt {
            Some(prompt) => ConversationHistory::with_system_prompt(prompt.clone()),
            None => ConversationHistory::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_core::Role;

    #[test]
    fn options_follow_config() {
        let config = Config {
            model: "glm-4-plus".to_string(),
            token_limit: "16k".to_string(),
            system_prompt: Some("be brief".to_string()),
            storage: Some(PathBuf::from("/tmp/records")),
            ..Config::default()
        };

        let options = SessionOptions::from_config(&config);

        assert_eq!(options.model, "glm-4-plus");
        assert_eq!(options.budget.max_tokens(), 16_000);
        assert_eq!(options.storage, Some(PathBuf::from("/tmp/records")));

        let history = options.initial_history();
        assert_eq!(history.active().len(), 1);
        assert_eq!(history.active()[0].role, Role::System);
    }

    #[test]
    fn defaults_have_no_system_prompt() {
        let options = SessionOptions::default();
        assert_eq!(options.budget.max_tokens(), 128_000);
        assert!(options.initial_history().active().is_empty());
    }
}

use std::path::{Path, PathBuf};

use colloquy_core::TokenBudget;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://open.bigmodel.cn/api/paas/v4";
pub const DEFAULT_MODEL: &str = "glm-4-flash";
pub const DEFAULT_TOKENIZER_MODEL: &str = "glm-4-plus";
pub const DEFAULT_TOKEN_LIMIT: &str = "128k";

const CONFIG_FILE_PATH: &str = "colloquy.toml";

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_tokenizer_model() -> String {
    DEFAULT_TOKENIZER_MODEL.to_string()
}

fn default_token_limit() -> String {
    DEFAULT_TOKEN_LIMIT.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// One of `8k`, `16k`, `32k`, `64k`, `128k`.
    #[serde(default = "default_token_limit")]
    pub token_limit: String,
    /// Directory holding saved conversation records.
    #[serde(default)]
    pub storage: Option<PathBuf>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Defaults to `{api_base}/tokenizer`.
    #[serde(default)]
    pub tokenizer_url: Option<String>,
    #[serde(default = "default_tokenizer_model")]
    pub tokenizer_model: String,
    #[serde(default)]
    pub http_proxy: String,
    #[serde(default)]
    pub https_proxy: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            model: default_model(),
            token_limit: default_token_limit(),
            storage: None,
            system_prompt: None,
            tokenizer_url: None,
            tokenizer_model: default_tokenizer_model(),
            http_proxy: String::new(),
            https_proxy: String::new(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Defaults, then `colloquy.toml` in the working directory, then
    /// environment overrides.
    pub fn new() -> Self {
        let mut config = Self::from_file_or_default(Path::new(CONFIG_FILE_PATH));
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn from_file_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("Failed to read {}: {}", path.display(), err);
                return Self::default();
            }
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("Failed to parse {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Override fields from variables resolved by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("COLLOQUY_API_KEY") {
            self.api_key = Some(api_key);
        }
        if let Some(api_base) = lookup("COLLOQUY_API_BASE") {
            self.api_base = api_base;
        }
        if let Some(model) = lookup("COLLOQUY_MODEL") {
            self.model = model;
        }
        if let Some(limit) = lookup("COLLOQUY_TOKEN_LIMIT") {
            self.token_limit = limit;
        }
        if let Some(storage) = lookup("COLLOQUY_STORAGE") {
            self.storage = Some(PathBuf::from(storage));
        }
        if let Some(prompt) = lookup("COLLOQUY_SYSTEM_PROMPT") {
            self.system_prompt = Some(prompt);
        }
        if let Some(url) = lookup("COLLOQUY_TOKENIZER_URL") {
            self.tokenizer_url = Some(url);
        }
        if let Some(model) = lookup("COLLOQUY_TOKENIZER_MODEL") {
            self.tokenizer_model = model;
        }
        if let Some(timeout) = lookup("COLLOQUY_TIMEOUT_SECS") {
            match timeout.trim().parse::<u64>() {
                Ok(secs) => self.timeout_secs = Some(secs),
                Err(_) => log::warn!("Ignoring invalid COLLOQUY_TIMEOUT_SECS={}", timeout),
            }
        }
        if let Some(http_proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Some(https_proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
    }

    pub fn budget(&self) -> TokenBudget {
        TokenBudget::from_label(&self.token_limit)
    }

    fn base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base())
    }

    pub fn models_url(&self) -> String {
        format!("{}/models", self.base())
    }

    pub fn tokenizer_endpoint(&self) -> String {
        self.tokenizer_url
            .clone()
            .unwrap_or_else(|| format!("{}/tokenizer", self.base()))
    }
}

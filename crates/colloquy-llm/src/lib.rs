pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
mod http;
pub mod protocol;
pub mod provider;

pub use blocking::BlockingCompletionClient;
pub use client::HttpCompletionClient;
pub use config::Config;
pub use error::{ErrorBody, LLMError, Result};
pub use protocol::{model_ids, ChatCompletionRequest, ChatCompletionResponse, Completion, Usage};
pub use provider::{BlockingCompletionBackend, CompletionBackend};

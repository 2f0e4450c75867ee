//! Token-count oracle seams.
//!
//! Token counts come from a remote tokenizer endpoint and are treated as an
//! opaque answer. The blocking and async forms mirror the two session
//! scheduling models.

use async_trait::async_trait;

use crate::error::OracleResult;
use crate::message::Message;

pub trait TokenOracle: Send + Sync {
    /// Prompt-token count of `messages`.
    fn count_tokens(&self, messages: &[Message]) -> OracleResult<u64>;
}

#[async_trait]
pub trait AsyncTokenOracle: Send + Sync {
    /// Prompt-token count of `messages`.
    async fn count_tokens(&self, messages: &[Message]) -> OracleResult<u64>;
}

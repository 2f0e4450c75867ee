//! Token budget management for bounded conversations.
//!
//! A conversation carries a hard token budget. When the endpoint (or the
//! tokenizer oracle) reports that the active history reached that budget, the
//! oldest complete user/assistant exchange is dropped from the active history.
//! The store history is never touched here.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::OracleResult;
use crate::message::{Message, Role};
use crate::oracle::{AsyncTokenOracle, TokenOracle};

/// Named context sizes offered by the completion provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenLimit {
    K8,
    K16,
    K32,
    K64,
    #[default]
    K128,
}

impl TokenLimit {
    pub const ALL: [TokenLimit; 5] = [Self::K8, Self::K16, Self::K32, Self::K64, Self::K128];

    pub fn tokens(self) -> u64 {
        match self {
            Self::K8 => 8_000,
            Self::K16 => 16_000,
            Self::K32 => 32_000,
            Self::K64 => 64_000,
            Self::K128 => 128_000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::K8 => "8k",
            Self::K16 => "16k",
            Self::K32 => "32k",
            Self::K64 => "64k",
            Self::K128 => "128k",
        }
    }
}

impl fmt::Display for TokenLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown token limit '{0}' (expected one of 8k, 16k, 32k, 64k, 128k)")]
pub struct UnknownTokenLimit(pub String);

impl FromStr for TokenLimit {
    type Err = UnknownTokenLimit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|limit| limit.label() == wanted)
            .ok_or_else(|| UnknownTokenLimit(s.to_string()))
    }
}

/// Maximum token count the active history may reach before eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    max_tokens: u64,
}

impl TokenBudget {
    pub fn new(max_tokens: u64) -> Self {
        Self { max_tokens }
    }

    /// Resolve a limit label, falling back to the largest size for labels
    /// the provider does not offer.
    pub fn from_label(label: &str) -> Self {
        match label.parse::<TokenLimit>() {
            Ok(limit) => limit.into(),
            Err(err) => {
                log::warn!("{}; using {}", err, TokenLimit::default());
                TokenLimit::default().into()
            }
        }
    }

    pub fn max_tokens(&self) -> u64 {
        self.max_tokens
    }

    /// Reaching the budget counts as exceeding it.
    pub fn is_exceeded_by(&self, tokens: u64) -> bool {
        tokens >= self.max_tokens
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        TokenLimit::default().into()
    }
}

impl From<TokenLimit> for TokenBudget {
    fn from(limit: TokenLimit) -> Self {
        Self::new(limit.tokens())
    }
}

/// Drop the oldest complete exchange from `history`.
///
/// The first `user` message and the first `assistant` message are located
/// independently, and the inclusive range between them is removed, so tool
/// turns interleaved between the two go with it. A leading system message is
/// never part of the range. Returns `false` and leaves `history` untouched
/// when either role is missing or the first assistant message precedes the
/// first user message.
pub fn evict_oldest_exchange(history: &mut Vec<Message>) -> bool {
    let user_index = history.iter().position(|m| m.role == Role::User);
    let assistant_index = history.iter().position(|m| m.role == Role::Assistant);

    let (Some(user_index), Some(assistant_index)) = (user_index, assistant_index) else {
        log::warn!(
            "No complete exchange to evict (user at {:?}, assistant at {:?})",
            user_index,
            assistant_index
        );
        return false;
    };
    if assistant_index < user_index {
        log::warn!(
            "First assistant turn at index {} precedes first user turn at {}; nothing evicted",
            assistant_index,
            user_index
        );
        return false;
    }

    history.drain(user_index..=assistant_index);
    log::debug!(
        "Evicted exchange [{}..={}], {} messages remain",
        user_index,
        assistant_index,
        history.len()
    );
    true
}

/// One step of the enforcement loop. Returns `true` when an exchange was
/// evicted and the history should be measured again.
fn evict_if_over(
    history: &mut Vec<Message>,
    budget: TokenBudget,
    measured: OracleResult<u64>,
) -> bool {
    match measured {
        Ok(tokens) if budget.is_exceeded_by(tokens) => {
            log::debug!(
                "History measures {} tokens against budget {}",
                tokens,
                budget.max_tokens()
            );
            evict_oldest_exchange(history)
        }
        Ok(_) => false,
        Err(err) => {
            log::warn!("Token count unavailable, skipping budget enforcement: {}", err);
            false
        }
    }
}

/// Evict exchanges until the oracle reports the history below `budget`, the
/// oracle fails, or nothing more can be evicted. Returns the number of
/// exchanges removed.
pub fn enforce_budget<O>(history: &mut Vec<Message>, budget: TokenBudget, oracle: &O) -> usize
where
    O: TokenOracle + ?Sized,
{
    let mut evicted = 0;
    loop {
        let measured = oracle.count_tokens(history);
        if !evict_if_over(history, budget, measured) {
            return evicted;
        }
        evicted += 1;
    }
}

/// Async form of [`enforce_budget`]; suspends only on the oracle call.
pub async fn enforce_budget_async<O>(
    history: &mut Vec<Message>,
    budget: TokenBudget,
    oracle: &O,
) -> usize
where
    O: AsyncTokenOracle + ?Sized,
{
    let mut evicted = 0;
    loop {
        let measured = oracle.count_tokens(history).await;
        if !evict_if_over(history, budget, measured) {
            return evicted;
        }
        evicted += 1;
    }
}

//! The active/store history pair shared by both session flavours.
//!
//! Sessions only differ in how they wait on the network; every history
//! mutation goes through [`ConversationHistory`] so both behave the same.

use crate::budget::{enforce_budget, enforce_budget_async, evict_oldest_exchange, TokenBudget};
use crate::message::{Message, Role};
use crate::oracle::{AsyncTokenOracle, TokenOracle};

/// One or more messages submitted together in a single turn.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outgoing(Vec<Message>);

impl Outgoing {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.0
    }
}

impl From<Message> for Outgoing {
    fn from(message: Message) -> Self {
        Self(vec![message])
    }
}

impl From<Vec<Message>> for Outgoing {
    fn from(messages: Vec<Message>) -> Self {
        Self(messages)
    }
}

/// Active history is what gets transmitted and is subject to eviction; store
/// history is the full record used for persistence. Store history only ever
/// grows by appends, except on [`clear`](Self::clear) and
/// [`replace`](Self::replace).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationHistory {
    active: Vec<Message>,
    store: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        let system = Message::system(prompt);
        Self {
            active: vec![system.clone()],
            store: vec![system],
        }
    }

    pub fn active(&self) -> &[Message] {
        &self.active
    }

    pub fn store(&self) -> &[Message] {
        &self.store
    }

    /// Bring the active history under `budget` as measured by `oracle`.
    pub fn enforce_budget<O>(&mut self, budget: TokenBudget, oracle: &O) -> usize
    where
        O: TokenOracle + ?Sized,
    {
        enforce_budget(&mut self.active, budget, oracle)
    }

    pub async fn enforce_budget_async<O>(&mut self, budget: TokenBudget, oracle: &O) -> usize
    where
        O: AsyncTokenOracle + ?Sized,
    {
        enforce_budget_async(&mut self.active, budget, oracle).await
    }

    /// Append the outgoing turn to both histories and return the messages
    /// to transmit. Staged messages stay even if the request later fails.
    pub fn stage(&mut self, outgoing: Outgoing) -> Vec<Message> {
        let messages = outgoing.into_messages();
        self.store.extend(messages.iter().cloned());
        self.active.extend(messages);
        self.active.clone()
    }

    /// Record the assistant reply. When the endpoint reported `total_tokens`
    /// at or above `budget`, evict the oldest exchange once from the active
    /// history. Returns whether an eviction happened.
    pub fn commit_reply(
        &mut self,
        reply: Message,
        total_tokens: Option<u64>,
        budget: TokenBudget,
    ) -> bool {
        self.store.push(reply.clone());
        self.active.push(reply);

        match total_tokens {
            Some(tokens) if budget.is_exceeded_by(tokens) => {
                log::debug!(
                    "Reported usage {} reached budget {}",
                    tokens,
                    budget.max_tokens()
                );
                evict_oldest_exchange(&mut self.active)
            }
            Some(_) => false,
            None => {
                log::debug!("Response carried no usage; skipping budget check");
                false
            }
        }
    }

    /// Reset both histories, keeping a leading system message if present.
    pub fn clear(&mut self) {
        let keep_system = self
            .active
            .first()
            .is_some_and(|message| message.role == Role::System);

        if keep_system {
            self.active.truncate(1);
            self.store.truncate(1);
        } else {
            self.active.clear();
            self.store.clear();
        }
    }

    /// Replace both histories with a restored record.
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.store = messages.clone();
        self.active = messages;
    }
}

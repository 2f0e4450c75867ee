//! Conversation sessions.
//!
//! [`ConversationSession`] blocks the calling thread on the network,
//! [`AsyncConversationSession`] suspends the calling task. Both keep their
//! history in a [`ConversationHistory`](colloquy_core::ConversationHistory)
//! and share the request/reply handling in `turn`, so they mutate history
//! identically.
//!
//! A session is single-writer: sends on one session must not overlap.

pub mod async_session;
pub mod error;
pub mod options;
pub mod session;
mod turn;

pub use async_session::AsyncConversationSession;
pub use error::{Result, SessionError};
pub use options::SessionOptions;
pub use session::ConversationSession;

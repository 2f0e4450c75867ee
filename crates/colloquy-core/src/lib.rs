pub mod budget;
pub mod error;
pub mod history;
pub mod inspect;
pub mod message;
pub mod oracle;
pub mod tools;

pub use budget::{
    enforce_budget, enforce_budget_async, evict_oldest_exchange, TokenBudget, TokenLimit,
};
pub use error::{OracleError, OracleResult};
pub use history::{ConversationHistory, Outgoing};
pub use inspect::{latest_reply, latest_tool_call};
pub use message::{ContentPart, ImageSource, ImageUrl, InputAudio, Message, MessageContent, Role};
pub use oracle::{AsyncTokenOracle, TokenOracle};
pub use tools::{FunctionCall, FunctionSchema, ToolCall, ToolSchema};

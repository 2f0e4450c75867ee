use colloquy_core::{ConversationHistory, Message, Outgoing, TokenBudget, ToolSchema};
use colloquy_llm::{ChatCompletionRequest, Completion};

/// Stage `outgoing` and build the request carrying the whole active history.
pub(crate) fn prepare(
    history: &mut ConversationHistory,
    model: &str,
    tools: &[ToolSchema],
    outgoing: Outgoing,
) -> ChatCompletionRequest {
    let staged = outgoing.len();
    let messages = history.stage(outgoing);
    log::info!(
        "Sending {} new message(s), {} in active history, model={}",
        staged,
        messages.len(),
        model
    );
    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        tools: tools.to_vec(),
    }
}

/// Commit a successful reply and apply the single-shot budget check.
pub(crate) fn absorb(
    history: &mut ConversationHistory,
    completion: Completion,
    budget: TokenBudget,
) -> Message {
    let reply = completion.message.clone();
    if history.commit_reply(completion.message, completion.total_tokens, budget) {
        log::info!(
            "Evicted oldest exchange, {} messages remain active",
            history.active().len()
        );
    }
    reply
}

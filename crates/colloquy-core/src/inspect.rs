use crate::message::{Message, Role};
use crate::tools::ToolCall;

/// Tool calls declared on the most recent assistant message.
///
/// Only that one message is inspected: if it carries no tool calls the
/// result is empty even when an earlier assistant turn had some. With `name`
/// set, the first call with that function name is returned on its own.
pub fn latest_tool_call(history: &[Message], name: Option<&str>) -> Vec<ToolCall> {
    let Some(calls) = history
        .iter()
        .rev()
        .find(|message| message.role == Role::Assistant)
        .and_then(|message| message.tool_calls.as_ref())
    else {
        return Vec::new();
    };

    match name {
        Some(name) => calls
            .iter()
            .find(|call| call.function.name == name)
            .cloned()
            .into_iter()
            .collect(),
        None => calls.clone(),
    }
}

/// Text of the most recent assistant message that has any.
pub fn latest_reply(history: &[Message]) -> Option<String> {
    history
        .iter()
        .rev()
        .filter(|message| message.role == Role::Assistant)
        .find_map(|message| message.text().filter(|text| !text.is_empty()))
        .map(|text| text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FunctionCall;

    fn call(id: &str, name: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            tool_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: "{}".to_string(),
            },
        }
    }

    #[test]
    fn returns_every_call_on_the_latest_assistant_turn() {
        let history = vec![
            Message::user("weather and time?"),
            Message::assistant("", Some(vec![call("c1", "weather"), call("c2", "clock")])),
            Message::tool_result("c1", "sunny"),
        ];

        let calls = latest_tool_call(&history, None);

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "c1");
        assert_eq!(calls[1].id, "c2");
    }

    #[test]
    fn filters_by_name_in_declaration_order() {
        let history = vec![Message::assistant(
            "",
            Some(vec![call("c1", "clock"), call("c2", "weather"), call("c3", "weather")]),
        )];

        let calls = latest_tool_call(&history, Some("weather"));

        assert_eq!(calls, vec![call("c2", "weather")]);
        assert!(latest_tool_call(&history, Some("missing")).is_empty());
    }

    #[test]
    fn only_the_most_recent_assistant_turn_counts() {
        let history = vec![
            Message::assistant("", Some(vec![call("c1", "weather")])),
            Message::tool_result("c1", "sunny"),
            Message::assistant("It is sunny.", None),
        ];

        assert!(latest_tool_call(&history, None).is_empty());
        assert!(latest_tool_call(&history, Some("weather")).is_empty());
    }

    #[test]
    fn no_assistant_turn_yields_empty() {
        assert!(latest_tool_call(&[Message::user("hi")], None).is_empty());
        assert!(latest_tool_call(&[], None).is_empty());
    }

    #[test]
    fn latest_reply_skips_empty_assistant_content() {
        let history = vec![
            Message::assistant("first", None),
            Message::user("again"),
            Message::assistant("", Some(vec![call("c1", "weather")])),
        ];

        assert_eq!(latest_reply(&history).as_deref(), Some("first"));
    }

    #[test]
    fn latest_reply_is_none_without_assistant_text() {
        assert_eq!(latest_reply(&[Message::user("hi")]), None);
    }
}

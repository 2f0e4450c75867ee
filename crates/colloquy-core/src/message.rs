use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tools::ToolCall;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Message body: a plain string, or typed parts for multimodal user turns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single part of a structured message body.
///
/// `ImageUrl` and `InputAudio` follow the OpenAI chat-completions convention,
/// `Image` follows the Anthropic base64 source block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
    InputAudio { input_audio: InputAudio },
    Image { source: ImageSource },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputAudio {
    pub data: String,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Provider-specific fields kept verbatim so persisted records match
    /// what the endpoint returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    fn with_text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Text(content.into())),
            tool_calls: None,
            tool_call_id: None,
            name: None,
            extra: Map::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_text(Role::User, content)
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            content: Some(MessageContent::Parts(parts)),
            ..Self::with_text(Role::User, String::new())
        }
    }

    pub fn assistant(content: impl Into<String>, tool_calls: Option<Vec<ToolCall>>) -> Self {
        Self {
            tool_calls,
            ..Self::with_text(Role::Assistant, content)
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_text(Role::Tool, content)
        }
    }

    /// Plain-text view of the message. Structured bodies yield their text
    /// parts joined together; `None` when there is no text at all.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self.content.as_ref()? {
            MessageContent::Text(text) => Some(Cow::Borrowed(text.as_str())),
            MessageContent::Parts(parts) => {
                let texts: Vec<&str> = parts.iter().filter_map(ContentPart::as_text).collect();
                if texts.is_empty() {
                    None
                } else {
                    Some(Cow::Owned(texts.concat()))
                }
            }
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FunctionCall;
    use serde_json::json;

    #[test]
    fn user_message_serializes_as_plain_string() {
        let value = serde_json::to_value(Message::user("Hello")).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "Hello"}));
    }

    #[test]
    fn structured_user_message_serializes_typed_parts() {
        let message = Message::user_parts(vec![
            ContentPart::text("look"),
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:image/png;base64,AAAA".to_string(),
                },
            },
        ]);

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["content"][0], json!({"type": "text", "text": "look"}));
        assert_eq!(value["content"][1]["type"], "image_url");
        assert_eq!(value["content"][1]["image_url"]["url"], "data:image/png;base64,AAAA");
    }

    #[test]
    fn assistant_reply_with_null_content_and_tool_calls_parses() {
        let raw = json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "get_weather", "arguments": "{\"city\":\"Paris\"}"}
            }]
        });

        let message: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert!(message.content.is_none());
        assert!(message.has_tool_calls());
        assert_eq!(message.tool_calls.unwrap()[0].function.name, "get_weather");
    }

    #[test]
    fn unknown_provider_fields_survive_a_round_trip() {
        let raw = json!({
            "role": "assistant",
            "content": "hi",
            "reasoning_content": "thinking..."
        });

        let message: Message = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(message.extra.get("reasoning_content"), Some(&json!("thinking...")));
        assert_eq!(serde_json::to_value(&message).unwrap(), raw);
    }

    #[test]
    fn text_view_joins_text_parts() {
        let message = Message::user_parts(vec![
            ContentPart::text("Hello, "),
            ContentPart::InputAudio {
                input_audio: InputAudio {
                    data: "AAAA".to_string(),
                    format: "wav".to_string(),
                },
            },
            ContentPart::text("world"),
        ]);
        assert_eq!(message.text().as_deref(), Some("Hello, world"));
    }

    #[test]
    fn text_view_is_none_without_content() {
        let message = Message::assistant(
            "",
            Some(vec![ToolCall {
                id: "call_1".to_string(),
                tool_type: "function".to_string(),
                function: FunctionCall {
                    name: "noop".to_string(),
                    arguments: "{}".to_string(),
                },
            }]),
        );
        assert_eq!(message.text().as_deref(), Some(""));

        let mut bare = message.clone();
        bare.content = None;
        assert!(bare.text().is_none());
    }
}

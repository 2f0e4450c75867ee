use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_tool_type() -> String {
    "function".to_string()
}

/// A tool invocation requested by the assistant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default = "default_tool_type")]
    pub tool_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// Raw JSON argument string as produced by the model.
    #[serde(default)]
    pub arguments: String,
}

/// A tool declaration attached to completion requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSchema {
    #[serde(rename = "type", default = "default_tool_type")]
    pub schema_type: String,
    pub function: FunctionSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Value,
}

impl ToolSchema {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            schema_type: default_tool_type(),
            function: FunctionSchema {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_call_defaults_missing_id_and_type() {
        let call: ToolCall =
            serde_json::from_value(json!({"function": {"name": "search", "arguments": "{}"}}))
                .unwrap();
        assert!(call.id.is_empty());
        assert_eq!(call.tool_type, "function");
    }

    #[test]
    fn tool_schema_serializes_openai_shape() {
        let schema = ToolSchema::function(
            "search_weather",
            "Search for weather information",
            json!({"type": "object", "properties": {"location": {"type": "string"}}}),
        );
        let value = serde_json::to_value(schema).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "search_weather");
    }
}

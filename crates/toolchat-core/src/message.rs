//! Conversation messages and their typed parts.
//!
//! The wire shape mirrors UI messages as exchanged with the chat endpoint:
//! `{ "id", "role", "parts": [{ "type": ..., ... }] }`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::MessageId;

/// Name of the tool whose invocations get a dedicated part variant.
pub const WEATHER_TOOL: &str = "weather";

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Message {
    /// Create a user message holding a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Create an empty assistant message that parts are streamed into.
    pub fn assistant(id: MessageId) -> Self {
        Self {
            id,
            role: Role::Assistant,
            parts: Vec::new(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Streaming state of a text part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    Streaming,
    Done,
}

/// Plain text fragment of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StreamState>,
}

/// Lifecycle of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolState {
    InputStreaming,
    InputAvailable,
    OutputAvailable,
    OutputError,

    /// A state this client has no name for, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

/// A tool call record: its arguments and, once available, its result.
///
/// Fields without a typed slot (provider metadata, preliminary flags) are
/// kept in `extra` so the record round-trips and dumps in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub tool_call_id: String,
    pub state: ToolState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_executed: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolInvocation {
    /// A call whose arguments are still being streamed.
    pub fn streaming(tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            state: ToolState::InputStreaming,
            input: None,
            output: None,
            error_text: None,
            provider_executed: None,
            extra: Map::new(),
        }
    }
}

/// A typed fragment of a message's content.
///
/// Only `text` and `tool-weather` are interpreted; everything else
/// (step markers, reasoning, other tools, data parts) is carried as raw
/// JSON so it survives a round trip to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Part {
    #[serde(rename = "text")]
    Text(TextPart),

    #[serde(rename = "tool-weather")]
    ToolWeather(ToolInvocation),

    /// Any other part type (fallback).
    #[serde(untagged)]
    Other(Value),
}

impl Part {
    /// A finished text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(TextPart {
            text: text.into(),
            state: None,
        })
    }

    /// Build the part for a call to `tool_name`.
    ///
    /// Weather calls get the dedicated variant; other tools keep their
    /// `tool-<name>` wire shape inside [`Part::Other`].
    pub fn tool(tool_name: &str, invocation: ToolInvocation) -> Self {
        if tool_name == WEATHER_TOOL {
            return Part::ToolWeather(invocation);
        }

        let mut fields = Map::new();
        fields.insert("type".into(), Value::String(format!("tool-{}", tool_name)));
        if let Ok(Value::Object(rest)) = serde_json::to_value(&invocation) {
            fields.extend(rest);
        }
        Part::Other(Value::Object(fields))
    }

    /// Wire `type` tag of this part, if it has one.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Part::Text(_) => Some("text"),
            Part::ToolWeather(_) => Some("tool-weather"),
            Part::Other(value) => value.get("type").and_then(Value::as_str),
        }
    }
}

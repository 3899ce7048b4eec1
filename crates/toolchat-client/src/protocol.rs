//! Wire types for the UI message stream protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use toolchat_core::{ChatId, Message};

/// Terminal data payload of a stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Request body posted to the chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub id: &'a ChatId,
    pub messages: &'a [Message],
    pub trigger: &'static str,
}

impl<'a> ChatRequest<'a> {
    /// Request a reply to the latest user message.
    pub fn submit(id: &'a ChatId, messages: &'a [Message]) -> Self {
        Self {
            id,
            messages,
            trigger: "submit-message",
        }
    }
}

/// One chunk of a streamed assistant reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum UiChunk {
    Start {
        #[serde(default)]
        message_id: Option<String>,
    },
    StartStep,
    FinishStep,

    TextStart {
        id: String,
    },
    TextDelta {
        id: String,
        delta: String,
    },
    TextEnd {
        id: String,
    },

    ToolInputStart {
        tool_call_id: String,
        tool_name: String,
        #[serde(default)]
        provider_executed: Option<bool>,
    },
    ToolInputDelta {
        tool_call_id: String,
        input_text_delta: String,
    },
    ToolInputAvailable {
        tool_call_id: String,
        tool_name: String,
        #[serde(default)]
        input: Value,
        #[serde(default)]
        provider_executed: Option<bool>,
        #[serde(default)]
        provider_metadata: Option<Value>,
    },
    ToolInputError {
        tool_call_id: String,
        tool_name: String,
        #[serde(default)]
        input: Value,
        error_text: String,
        #[serde(default)]
        provider_metadata: Option<Value>,
    },
    ToolOutputAvailable {
        tool_call_id: String,
        #[serde(default)]
        output: Value,
        #[serde(default)]
        preliminary: Option<bool>,
    },
    ToolOutputError {
        tool_call_id: String,
        error_text: String,
    },

    Error {
        error_text: String,
    },
    Finish,
    Abort,

    /// Any other chunk type (sources, files, data parts, metadata).
    #[serde(untagged)]
    Unknown(Value),
}

/// Decode one SSE data payload.
///
/// Returns `None` for the terminal `[DONE]` marker.
pub fn parse_chunk(data: &str) -> Result<Option<UiChunk>, serde_json::Error> {
    if data.trim() == DONE_MARKER {
        return Ok(None);
    }
    serde_json::from_str(data).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use toolchat_core::Message;

    #[test]
    fn test_text_chunks_parsing() {
        let chunk = parse_chunk(r#"{"type":"text-delta","id":"t1","delta":"Hel"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            chunk,
            UiChunk::TextDelta {
                id: "t1".into(),
                delta: "Hel".into()
            }
        );
    }

    #[test]
    fn test_start_chunk_parsing() {
        let chunk = parse_chunk(r#"{"type":"start","messageId":"msg-42"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            chunk,
            UiChunk::Start {
                message_id: Some("msg-42".into())
            }
        );

        let bare = parse_chunk(r#"{"type":"start"}"#).unwrap().unwrap();
        assert_eq!(bare, UiChunk::Start { message_id: None });
    }

    #[test]
    fn test_tool_chunks_parsing() {
        let chunk = parse_chunk(
            r#"{"type":"tool-input-available","toolCallId":"call_1","toolName":"weather","input":{"location":"London"}}"#,
        )
        .unwrap()
        .unwrap();

        if let UiChunk::ToolInputAvailable {
            tool_call_id,
            tool_name,
            input,
            provider_executed,
            provider_metadata,
        } = chunk
        {
            assert_eq!(tool_call_id, "call_1");
            assert_eq!(tool_name, "weather");
            assert_eq!(input, json!({"location": "London"}));
            assert_eq!(provider_executed, None);
            assert_eq!(provider_metadata, None);
        } else {
            panic!("Expected tool-input-available chunk");
        }
    }

    #[test]
    fn test_unit_chunks_ignore_extra_fields() {
        let chunk = parse_chunk(r#"{"type":"finish","messageMetadata":{"k":1}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(chunk, UiChunk::Finish);
    }

    #[test]
    fn test_unknown_chunk_falls_back() {
        let chunk = parse_chunk(r#"{"type":"source-url","sourceId":"s","url":"https://x"}"#)
            .unwrap()
            .unwrap();
        assert!(matches!(chunk, UiChunk::Unknown(_)));
    }

    #[test]
    fn test_done_marker() {
        assert_eq!(parse_chunk("[DONE]").unwrap(), None);
        assert!(parse_chunk("{not json").is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let id = ChatId::new("chat-1");
        let mut message = Message::user_text("Hi");
        message.id = "u1".into();
        let messages = vec![message];

        let body = serde_json::to_value(ChatRequest::submit(&id, &messages)).unwrap();
        assert_eq!(
            body,
            json!({
                "id": "chat-1",
                "messages": [{"id": "u1", "role": "user", "parts": [{"type": "text", "text": "Hi"}]}],
                "trigger": "submit-message"
            })
        );
    }
}

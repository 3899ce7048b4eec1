//! Assembles streamed chunks into an assistant message.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use toolchat_core::{Message, MessageId, Part, StreamState, TextPart, ToolInvocation, ToolState};

use crate::protocol::UiChunk;

/// Effect of applying one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The message changed and should be republished.
    Changed,
    /// Nothing visible changed.
    Unchanged,
    /// The server finished (or aborted) the reply.
    Finished,
    /// The server reported an error.
    Failed(String),
}

/// Tool call being tracked by call id.
#[derive(Debug)]
struct ToolSlot {
    index: usize,
    name: String,
    invocation: ToolInvocation,
    raw_input: String,
}

/// Builds one assistant message from a stream of chunks.
///
/// Text deltas are routed to their part by id and tool updates by call id,
/// so parts are only ever appended or updated in place.
#[derive(Debug)]
pub struct ReplyBuilder {
    message: Message,
    text_parts: HashMap<String, usize>,
    tools: HashMap<String, ToolSlot>,
    /// Ids already used in the conversation; a server id among them is refused.
    taken: HashSet<MessageId>,
}

impl ReplyBuilder {
    pub fn new(id: MessageId) -> Self {
        Self {
            message: Message::assistant(id),
            text_parts: HashMap::new(),
            tools: HashMap::new(),
            taken: HashSet::new(),
        }
    }

    /// Refuse to adopt any of `ids` from the `start` chunk.
    pub fn with_taken_ids(mut self, ids: HashSet<MessageId>) -> Self {
        self.taken = ids;
        self
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Whether the message has anything worth showing yet.
    pub fn has_parts(&self) -> bool {
        !self.message.parts.is_empty()
    }

    /// Apply one chunk to the message under construction.
    pub fn apply(&mut self, chunk: UiChunk) -> ChunkOutcome {
        match chunk {
            UiChunk::Start { message_id } => {
                // The id is only adopted before anything was published under the old one.
                if let Some(id) = message_id.map(MessageId::new) {
                    if self.taken.contains(&id) {
                        warn!(message_id = %id, "Server reused a message id; keeping local id");
                    } else if !self.has_parts() {
                        self.message.id = id;
                    }
                }
                ChunkOutcome::Unchanged
            }
            UiChunk::StartStep => {
                self.message
                    .parts
                    .push(Part::Other(serde_json::json!({ "type": "step-start" })));
                ChunkOutcome::Changed
            }
            UiChunk::FinishStep => ChunkOutcome::Unchanged,

            UiChunk::TextStart { id } => {
                self.text_parts.insert(id, self.message.parts.len());
                self.message.parts.push(Part::Text(TextPart {
                    text: String::new(),
                    state: Some(StreamState::Streaming),
                }));
                ChunkOutcome::Changed
            }
            UiChunk::TextDelta { id, delta } => match self.text_part_mut(&id) {
                Some(part) => {
                    part.text.push_str(&delta);
                    ChunkOutcome::Changed
                }
                None => {
                    warn!(id = %id, "Text delta for unknown part");
                    ChunkOutcome::Unchanged
                }
            },
            UiChunk::TextEnd { id } => match self.text_part_mut(&id) {
                Some(part) => {
                    part.state = Some(StreamState::Done);
                    ChunkOutcome::Changed
                }
                None => ChunkOutcome::Unchanged,
            },

            UiChunk::ToolInputStart {
                tool_call_id,
                tool_name,
                provider_executed,
            } => {
                let mut invocation = ToolInvocation::streaming(tool_call_id.clone());
                invocation.provider_executed = provider_executed;
                self.insert_tool(tool_call_id, tool_name, invocation);
                ChunkOutcome::Changed
            }
            UiChunk::ToolInputDelta {
                tool_call_id,
                input_text_delta,
            } => {
                let Some(slot) = self.tools.get_mut(&tool_call_id) else {
                    return ChunkOutcome::Unchanged;
                };
                slot.raw_input.push_str(&input_text_delta);

                // Partial JSON stays hidden until it parses.
                match serde_json::from_str::<Value>(&slot.raw_input) {
                    Ok(input) => self.update_known_tool(&tool_call_id, |call| {
                        call.input = Some(input);
                    }),
                    Err(_) => ChunkOutcome::Unchanged,
                }
            }
            UiChunk::ToolInputAvailable {
                tool_call_id,
                tool_name,
                input,
                provider_executed,
                provider_metadata,
            } => {
                self.update_tool(tool_call_id, tool_name, |call| {
                    call.state = ToolState::InputAvailable;
                    call.input = Some(input);
                    if provider_executed.is_some() {
                        call.provider_executed = provider_executed;
                    }
                    if let Some(metadata) = provider_metadata {
                        call.extra.insert("callProviderMetadata".into(), metadata);
                    }
                });
                ChunkOutcome::Changed
            }
            UiChunk::ToolInputError {
                tool_call_id,
                tool_name,
                input,
                error_text,
                provider_metadata,
            } => {
                self.update_tool(tool_call_id, tool_name, |call| {
                    call.state = ToolState::OutputError;
                    call.input = Some(input);
                    call.error_text = Some(error_text);
                    if let Some(metadata) = provider_metadata {
                        call.extra.insert("callProviderMetadata".into(), metadata);
                    }
                });
                ChunkOutcome::Changed
            }
            UiChunk::ToolOutputAvailable {
                tool_call_id,
                output,
                preliminary,
            } => self.update_known_tool(&tool_call_id, |call| {
                call.state = ToolState::OutputAvailable;
                call.output = Some(output);
                match preliminary {
                    Some(flag) => {
                        call.extra.insert("preliminary".into(), Value::Bool(flag));
                    }
                    None => {
                        call.extra.remove("preliminary");
                    }
                }
            }),
            UiChunk::ToolOutputError {
                tool_call_id,
                error_text,
            } => self.update_known_tool(&tool_call_id, |call| {
                call.state = ToolState::OutputError;
                call.error_text = Some(error_text);
            }),

            UiChunk::Error { error_text } => ChunkOutcome::Failed(error_text),
            UiChunk::Finish | UiChunk::Abort => ChunkOutcome::Finished,
            UiChunk::Unknown(value) => {
                debug!(
                    chunk_type = value.get("type").and_then(|t| t.as_str()).unwrap_or("?"),
                    "Ignoring chunk"
                );
                ChunkOutcome::Unchanged
            }
        }
    }

    fn text_part_mut(&mut self, id: &str) -> Option<&mut TextPart> {
        let index = *self.text_parts.get(id)?;
        match self.message.parts.get_mut(index) {
            Some(Part::Text(text)) => Some(text),
            _ => None,
        }
    }

    fn insert_tool(&mut self, tool_call_id: String, name: String, invocation: ToolInvocation) {
        let index = self.message.parts.len();
        self.message.parts.push(Part::tool(&name, invocation.clone()));
        self.tools.insert(
            tool_call_id,
            ToolSlot {
                index,
                name,
                invocation,
                raw_input: String::new(),
            },
        );
    }

    /// Update a tool call, creating its part if the call was never started.
    fn update_tool<F>(&mut self, tool_call_id: String, tool_name: String, update: F)
    where
        F: FnOnce(&mut ToolInvocation),
    {
        if !self.tools.contains_key(&tool_call_id) {
            let invocation = ToolInvocation::streaming(tool_call_id.clone());
            self.insert_tool(tool_call_id.clone(), tool_name, invocation);
        }
        self.update_known_tool(&tool_call_id, update);
    }

    fn update_known_tool<F>(&mut self, tool_call_id: &str, update: F) -> ChunkOutcome
    where
        F: FnOnce(&mut ToolInvocation),
    {
        let Some(slot) = self.tools.get_mut(tool_call_id) else {
            warn!(tool_call_id = %tool_call_id, "Update for unknown tool call");
            return ChunkOutcome::Unchanged;
        };

        update(&mut slot.invocation);
        if let Some(part) = self.message.parts.get_mut(slot.index) {
            *part = Part::tool(&slot.name, slot.invocation.clone());
        }
        ChunkOutcome::Changed
    }
}

//! Renderer: a pure mapping from (messages, input) to a view tree.
//!
//! Front ends draw the tree; they never look at messages directly.

use tracing::warn;

use crate::message::{Message, Part, Role};

pub const PAGE_TITLE: &str = "AI Chat with Tools";
pub const PAGE_SUBTITLE: &str = "Try asking about the weather!";
pub const INPUT_PLACEHOLDER: &str = "Try: What's the weather in New York?";
pub const SUBMIT_LABEL: &str = "Send";
pub const PALETTE_TITLE: &str = "Try these prompts:";
pub const WEATHER_TOOL_LABEL: &str = "Weather Tool Called:";

/// Fixed example prompts, in display order.
pub const EXAMPLE_PROMPTS: [&str; 3] = [
    "What's the weather in Tokyo?",
    "How's the weather in London?",
    "Tell me about the weather in Paris",
];

/// Horizontal placement of a message bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Visual style of a message bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bubble {
    User,
    Assistant,
}

/// Rendered content of one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Verbatim text; whitespace and line breaks are significant.
    Text(String),
    /// Labeled diagnostic dump of a tool call part.
    ToolCall { label: &'static str, dump: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub id: String,
    pub align: Align,
    pub bubble: Bubble,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub title: &'static str,
    pub subtitle: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub value: String,
    pub placeholder: &'static str,
    pub submit_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteView {
    pub title: &'static str,
    pub prompts: &'static [&'static str],
}

/// Whole page, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub header: HeaderView,
    pub messages: Vec<MessageView>,
    pub form: FormView,
    pub palette: PaletteView,
}

/// Render the page for the given messages and input value.
pub fn render(messages: &[Message], input: &str) -> PageView {
    PageView {
        header: HeaderView {
            title: PAGE_TITLE,
            subtitle: PAGE_SUBTITLE,
        },
        messages: messages.iter().map(render_message).collect(),
        form: FormView {
            value: input.to_string(),
            placeholder: INPUT_PLACEHOLDER,
            submit_label: SUBMIT_LABEL,
        },
        palette: PaletteView {
            title: PALETTE_TITLE,
            prompts: &EXAMPLE_PROMPTS,
        },
    }
}

/// Render a single message bubble.
pub fn render_message(message: &Message) -> MessageView {
    let (align, bubble) = match message.role {
        Role::User => (Align::Right, Bubble::User),
        Role::Assistant => (Align::Left, Bubble::Assistant),
    };

    MessageView {
        id: message.id.to_string(),
        align,
        bubble,
        blocks: message.parts.iter().filter_map(render_part).collect(),
    }
}

/// Render one part; parts without a visual form yield `None`.
pub fn render_part(part: &Part) -> Option<Block> {
    match part {
        Part::Text(text) => Some(Block::Text(text.text.clone())),
        Part::ToolWeather(_) => Some(Block::ToolCall {
            label: WEATHER_TOOL_LABEL,
            dump: dump_part(part),
        }),
        Part::Other(_) => None,
    }
}

/// Pretty, key-order-preserving JSON of a part.
fn dump_part(part: &Part) -> String {
    match serde_json::to_string_pretty(part) {
        Ok(dump) => dump,
        Err(e) => {
            warn!(error = %e, "Failed to serialize tool part");
            format!("{:?}", part)
        }
    }
}

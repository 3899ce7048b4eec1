//! Core types for toolchat.
//!
//! A single chat page: conversation messages owned by a [`ConversationStore`],
//! an [`InputState`] buffer, and a pure renderer that turns both into a
//! [`PageView`]. No networking lives here.

pub mod ids;
pub mod input;
pub mod message;
pub mod page;
pub mod store;
pub mod view;

pub use ids::{ChatId, MessageId};
pub use input::InputState;
pub use message::{Message, Part, Role, StreamState, TextPart, ToolInvocation, ToolState};
pub use page::{ChatPage, SubmitEvent};
pub use store::{ChatStatus, Conversation, ConversationStore, SharedConversation};
pub use view::{render, Align, Block, Bubble, MessageView, PageView, EXAMPLE_PROMPTS};

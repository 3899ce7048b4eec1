//! Conversation Store contract.
//!
//! The page never owns messages. It reads snapshots from a store and calls
//! [`ConversationStore::send`]; the store appends messages on its own
//! schedule and notifies subscribers through a watch channel.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::ids::MessageId;
use crate::message::Message;

/// Request lifecycle of the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatStatus {
    /// Idle, ready for the next message.
    #[default]
    Ready,
    /// Request sent, waiting for the first chunk.
    Submitted,
    /// Assistant response is streaming in.
    Streaming,
    /// The last request failed.
    Error(String),
}

impl fmt::Display for ChatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatStatus::Ready => f.write_str("ready"),
            ChatStatus::Submitted => f.write_str("submitted"),
            ChatStatus::Streaming => f.write_str("streaming"),
            ChatStatus::Error(e) => write!(f, "error: {}", e),
        }
    }
}

/// Snapshot of the conversation published to subscribers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    pub messages: Vec<Message>,
    pub status: ChatStatus,
}

/// External collaborator holding the message history.
pub trait ConversationStore: Send + Sync {
    /// Current snapshot.
    fn conversation(&self) -> Conversation;

    /// Append a user message and request an assistant reply.
    ///
    /// Returns immediately; the outcome is only visible through later
    /// snapshots.
    fn send(&self, text: String);

    /// Receiver that is notified on every change.
    fn subscribe(&self) -> watch::Receiver<Conversation>;

    /// Ordered messages of the current snapshot.
    fn messages(&self) -> Vec<Message> {
        self.conversation().messages
    }
}

impl<S: ConversationStore + ?Sized> ConversationStore for Arc<S> {
    fn conversation(&self) -> Conversation {
        (**self).conversation()
    }

    fn send(&self, text: String) {
        (**self).send(text)
    }

    fn subscribe(&self) -> watch::Receiver<Conversation> {
        (**self).subscribe()
    }
}

/// Watch-backed conversation state shared by store implementations.
///
/// Messages can only be appended or replaced at the slot they were pushed
/// to; nothing is ever removed or reordered.
#[derive(Debug, Clone)]
pub struct SharedConversation {
    tx: Arc<watch::Sender<Conversation>>,
}

impl Default for SharedConversation {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedConversation {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Conversation::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> Conversation {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Conversation> {
        self.tx.subscribe()
    }

    /// Append a message to the end of the conversation and return its index.
    pub fn push(&self, message: Message) -> usize {
        let mut index = 0;
        self.tx.send_modify(|c| {
            index = c.messages.len();
            c.messages.push(message);
        });
        index
    }

    /// Replace the message at `index`, which must hold the same id.
    ///
    /// Returns false and leaves the conversation untouched otherwise.
    pub fn replace(&self, index: usize, message: Message) -> bool {
        self.tx.send_if_modified(|c| match c.messages.get_mut(index) {
            Some(existing) if existing.id == message.id => {
                *existing = message;
                true
            }
            _ => false,
        })
    }

    /// Ids of every message currently in the conversation.
    pub fn message_ids(&self) -> HashSet<MessageId> {
        self.tx.borrow().messages.iter().map(|m| m.id.clone()).collect()
    }

    pub fn set_status(&self, status: ChatStatus) {
        self.tx.send_if_modified(|c| {
            if c.status == status {
                return false;
            }
            c.status = status;
            true
        });
    }
}

//! HTTP conversation store for toolchat.
//!
//! Posts the conversation to a chat endpoint and consumes the UI message
//! stream it answers with (Server-Sent Events carrying JSON chunks),
//! publishing the assistant reply as it grows.
//!
//! # Example
//!
//! ```rust,no_run
//! use toolchat_client::{ChatConfig, HttpChatStore};
//! use toolchat_core::ConversationStore;
//!
//! # async fn demo() -> Result<(), toolchat_client::ClientError> {
//! let (store, backend) = HttpChatStore::new(&ChatConfig::default())?;
//! tokio::spawn(backend.run());
//!
//! store.send("What's the weather in Tokyo?".to_string());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;
pub mod protocol;
pub mod reply;
pub mod sse;
pub mod store;

pub use error::ClientError;
pub use http::{ChatConfig, ChatTransport, DEFAULT_API_PATH, DEFAULT_BASE_URL};
pub use protocol::{parse_chunk, ChatRequest, UiChunk};
pub use reply::{ChunkOutcome, ReplyBuilder};
pub use sse::SseDecoder;
pub use store::{ChatBackend, HttpChatStore};

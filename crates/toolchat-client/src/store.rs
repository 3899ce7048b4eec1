//! Conversation Store backed by the HTTP chat endpoint.

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use toolchat_core::{
    ChatId, ChatStatus, Conversation, ConversationStore, Message, MessageId, SharedConversation,
};

use crate::error::ClientError;
use crate::http::{ChatConfig, ChatTransport};
use crate::protocol::{parse_chunk, ChatRequest};
use crate::reply::{ChunkOutcome, ReplyBuilder};
use crate::sse::SseDecoder;

/// Commands sent from the store handle to the backend task.
#[derive(Debug)]
enum StoreCommand {
    /// Request a reply for the conversation as it stands.
    Submit,
    /// Stop the backend, abandoning any in-flight reply.
    Quit,
}

/// Store handle used by the UI thread.
///
/// `send` appends the user message right away and queues a request; the
/// [`ChatBackend`] task performs requests one at a time.
pub struct HttpChatStore {
    shared: SharedConversation,
    cmd_tx: mpsc::UnboundedSender<StoreCommand>,
}

impl HttpChatStore {
    /// Create the store handle and the backend that must be run on a tokio runtime.
    pub fn new(config: &ChatConfig) -> Result<(Self, ChatBackend), ClientError> {
        let transport = ChatTransport::new(config)?;
        let shared = SharedConversation::new();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let backend = ChatBackend {
            chat_id: ChatId::generate(),
            transport,
            shared: shared.clone(),
            cmd_rx,
        };

        Ok((Self { shared, cmd_tx }, backend))
    }

    /// Ask the backend to stop.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(StoreCommand::Quit);
    }
}

impl ConversationStore for HttpChatStore {
    fn conversation(&self) -> Conversation {
        self.shared.snapshot()
    }

    fn send(&self, text: String) {
        self.shared.push(Message::user_text(text));
        if self.cmd_tx.send(StoreCommand::Submit).is_err() {
            warn!("Chat backend is not running; message not sent");
        }
    }

    fn subscribe(&self) -> watch::Receiver<Conversation> {
        self.shared.subscribe()
    }
}

/// Background task that talks to the chat endpoint.
pub struct ChatBackend {
    chat_id: ChatId,
    transport: ChatTransport,
    shared: SharedConversation,
    cmd_rx: mpsc::UnboundedReceiver<StoreCommand>,
}

impl ChatBackend {
    /// Run the request loop until quit or until every store handle is dropped.
    pub async fn run(mut self) {
        info!(chat_id = %self.chat_id, url = %self.transport.url(), "Chat backend started");

        let mut pending = 0usize;
        loop {
            if pending == 0 {
                match self.cmd_rx.recv().await {
                    Some(StoreCommand::Submit) => pending += 1,
                    Some(StoreCommand::Quit) | None => break,
                }
            }
            pending -= 1;

            let exchange = exchange(&self.transport, &self.shared, &self.chat_id);
            tokio::pin!(exchange);

            // Keep draining commands while the reply streams so quit is prompt.
            let result = loop {
                tokio::select! {
                    result = &mut exchange => break Some(result),
                    cmd = self.cmd_rx.recv() => match cmd {
                        Some(StoreCommand::Submit) => pending += 1,
                        Some(StoreCommand::Quit) | None => break None,
                    },
                }
            };

            match result {
                Some(Ok(())) => self.shared.set_status(ChatStatus::Ready),
                Some(Err(e)) => {
                    error!(error = %e, "Chat request failed");
                    self.shared.set_status(ChatStatus::Error(e.to_string()));
                }
                None => {
                    info!("Quit requested during a reply");
                    break;
                }
            }
        }

        info!("Chat backend shutdown complete");
    }
}

/// One request/response round trip, publishing the reply as it streams.
async fn exchange(
    transport: &ChatTransport,
    shared: &SharedConversation,
    chat_id: &ChatId,
) -> Result<(), ClientError> {
    shared.set_status(ChatStatus::Submitted);

    let messages = shared.snapshot().messages;
    let request = ChatRequest::submit(chat_id, &messages);
    let mut response = transport.open(&request).await?;

    let taken = messages.iter().map(|m| m.id.clone()).collect();
    let mut reply = PublishedReply {
        builder: ReplyBuilder::new(MessageId::generate()).with_taken_ids(taken),
        index: None,
    };
    let mut decoder = SseDecoder::new();

    while let Some(bytes) = response.chunk().await? {
        for data in decoder.push(&bytes) {
            if reply.apply_frame(&data, shared)? {
                return Ok(());
            }
        }
    }
    if let Some(data) = decoder.finish() {
        reply.apply_frame(&data, shared)?;
    }

    debug!(message_id = %reply.builder.message().id, "Stream closed");
    Ok(())
}

/// The reply under construction and the slot it was appended to.
struct PublishedReply {
    builder: ReplyBuilder,
    index: Option<usize>,
}

impl PublishedReply {
    /// Apply one SSE payload. Returns true once the stream is done.
    fn apply_frame(
        &mut self,
        data: &str,
        shared: &SharedConversation,
    ) -> Result<bool, ClientError> {
        let Some(chunk) = parse_chunk(data)? else {
            return Ok(true);
        };

        shared.set_status(ChatStatus::Streaming);
        match self.builder.apply(chunk) {
            ChunkOutcome::Changed => {
                self.publish(shared);
                Ok(false)
            }
            ChunkOutcome::Unchanged | ChunkOutcome::Finished => Ok(false),
            ChunkOutcome::Failed(text) => Err(ClientError::Stream(text)),
        }
    }

    /// Append the reply on its first visible change, then update only that slot.
    fn publish(&mut self, shared: &SharedConversation) {
        if !self.builder.has_parts() {
            return;
        }
        let message = self.builder.message().clone();
        match self.index {
            Some(index) => {
                if !shared.replace(index, message) {
                    warn!(index, "Reply slot no longer matches; update dropped");
                }
            }
            None => self.index = Some(shared.push(message)),
        }
    }
}

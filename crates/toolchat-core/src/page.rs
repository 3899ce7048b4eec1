//! The chat page: Input State plus the handlers wired to the view.

use tracing::debug;

use crate::input::InputState;
use crate::store::ConversationStore;
use crate::view::{self, PageView, EXAMPLE_PROMPTS};

/// A form submission dispatched by the front end.
///
/// Front ends run the form's default action (reloading the page) unless
/// a handler prevents it.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Chat page bound to a conversation store.
pub struct ChatPage<S> {
    store: S,
    input: InputState,
}

impl<S: ConversationStore> ChatPage<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            input: InputState::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Keystroke-level edits of the text field.
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Text field change: replace the value wholesale.
    pub fn on_input(&mut self, value: impl Into<String>) {
        self.input.set(value);
    }

    /// Activate example prompt `index`. Never submits.
    ///
    /// Returns the applied prompt, or `None` for an index outside the palette.
    pub fn apply_prompt(&mut self, index: usize) -> Option<&'static str> {
        let prompt = EXAMPLE_PROMPTS.get(index).copied()?;
        self.input.overwrite(prompt);
        Some(prompt)
    }

    /// Form submission handler.
    ///
    /// Sends the current value as-is, including empty or whitespace-only
    /// values, then clears the input.
    pub fn submit(&mut self, event: &mut SubmitEvent) {
        event.prevent_default();
        let text = self.input.value().to_string();
        debug!(chars = text.chars().count(), "Submitting message");
        self.store.send(text);
        self.input.clear();
    }

    /// Render the page from the store's latest snapshot.
    pub fn render(&self) -> PageView {
        view::render(&self.store.messages(), self.input.value())
    }
}

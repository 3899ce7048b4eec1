//! Application state and main event loop.

use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use tokio::sync::watch;
use tracing::{debug, info};

use toolchat_core::{ChatPage, ChatStatus, Conversation, ConversationStore, SubmitEvent};

use crate::event::{action_for, Action, Edit};
use crate::ui::{self, Screen, ScrollState};

/// Main application: the chat page plus terminal-only view state.
pub struct App<S> {
    /// Page holding the input buffer and the store handle.
    page: ChatPage<S>,

    /// Change notifications from the store.
    updates: watch::Receiver<Conversation>,

    /// Last status seen on the store, shown in the footer.
    status: ChatStatus,

    /// Message list scroll position.
    scroll: ScrollState,
}

impl<S: ConversationStore> App<S> {
    pub fn new(page: ChatPage<S>) -> Self {
        let updates = page.store().subscribe();
        let status = updates.borrow().status.clone();
        Self {
            page,
            updates,
            status,
            scroll: ScrollState::default(),
        }
    }

    /// Run the main event loop.
    ///
    /// Runs on the main thread: draws the page, handles key presses, and
    /// picks up store changes between polls.
    pub fn run(&mut self, mut terminal: DefaultTerminal) -> std::io::Result<()> {
        loop {
            let view = self.page.render();
            let screen = Screen {
                view: &view,
                cursor: self.page.input().cursor(),
                status: &self.status,
            };
            terminal.draw(|frame| ui::render(frame, &screen, &mut self.scroll))?;

            // Poll terminal events (non-blocking with short timeout)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key) {
                        break; // quit requested
                    }
                }
            }

            self.sync_store();
        }

        info!("Quit requested");
        Ok(())
    }

    /// Pick up the store's latest status, if it changed.
    fn sync_store(&mut self) {
        if !self.updates.has_changed().unwrap_or(false) {
            return;
        }
        let conversation = self.updates.borrow_and_update();
        if conversation.status != self.status {
            debug!(
                status = %conversation.status,
                messages = conversation.messages.len(),
                "Conversation status changed"
            );
            self.status = conversation.status.clone();
        }
    }

    /// Handle a key press.
    ///
    /// Returns true if the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let Some(action) = action_for(key) else {
            return false;
        };

        match action {
            Action::Quit => return true,
            Action::Submit => self.submit(),
            Action::ApplyPrompt(index) => {
                if let Some(prompt) = self.page.apply_prompt(index) {
                    debug!(prompt, "Applied example prompt");
                }
            }
            Action::Edit(edit) => self.edit(edit),
            Action::ScrollUp(lines) => self.scroll.up(lines),
            Action::ScrollDown(lines) => self.scroll.down(lines),
            Action::ScrollToBottom => self.scroll.follow(),
        }
        false
    }

    fn submit(&mut self) {
        let mut event = SubmitEvent::new();
        self.page.submit(&mut event);
        debug!(default_prevented = event.default_prevented(), "Form submitted");

        // Show the reply as it arrives.
        if !self.scroll.is_following() {
            debug!("Jumping to latest message");
            self.scroll.follow();
        }
    }

    fn edit(&mut self, edit: Edit) {
        let input = self.page.input_mut();
        match edit {
            Edit::Insert(c) => input.insert_char(c),
            Edit::Backspace => input.backspace(),
            Edit::Delete => input.delete(),
            Edit::Left => input.move_left(),
            Edit::Right => input.move_right(),
            Edit::Home => input.move_home(),
            Edit::End => input.move_end(),
            Edit::Clear => input.set(""),
        }
    }
}

//! Key bindings: terminal key events to page actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Keystroke-level edits of the input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Clear,
}

/// Everything a key press can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit(Edit),
    Submit,
    /// Apply the example prompt at this palette index.
    ApplyPrompt(usize),
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollToBottom,
    Quit,
}

const PAGE: usize = 10;

/// Translate a key press into an action, if it is bound.
pub fn action_for(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    let action = match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('u') if ctrl => Action::Edit(Edit::Clear),
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(c) => Action::Edit(Edit::Insert(c)),

        KeyCode::Enter => Action::Submit,
        KeyCode::F(n @ 1..=3) => Action::ApplyPrompt(usize::from(n) - 1),

        KeyCode::Backspace => Action::Edit(Edit::Backspace),
        KeyCode::Delete => Action::Edit(Edit::Delete),
        KeyCode::Left => Action::Edit(Edit::Left),
        KeyCode::Right => Action::Edit(Edit::Right),
        KeyCode::Home => Action::Edit(Edit::Home),
        KeyCode::End if ctrl => Action::ScrollToBottom,
        KeyCode::End => Action::Edit(Edit::End),

        KeyCode::Up => Action::ScrollUp(1),
        KeyCode::Down => Action::ScrollDown(1),
        KeyCode::PageUp => Action::ScrollUp(PAGE),
        KeyCode::PageDown => Action::ScrollDown(PAGE),

        _ => return None,
    };
    Some(action)
}

//! Input State: the text buffer bound to the message field.

/// Ephemeral, never persisted input buffer.
///
/// The value is replaced wholesale on every edit. Editing helpers compute
/// the next value from the current one and a cursor (in chars) and then
/// replace it; there is no validation or trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    value: String,
    cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor position in chars.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replace the value, as the text field does on every keystroke.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    /// Overwrite the value from outside the text field (prompt palette).
    pub fn overwrite(&mut self, value: &str) {
        self.set(value);
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Insert a char at the cursor (unicode-safe).
    pub fn insert_char(&mut self, c: char) {
        let byte_idx = self.byte_index(self.cursor);
        let mut next = self.value.clone();
        next.insert(byte_idx, c);
        let cursor = self.cursor + 1;
        self.replace(next, cursor);
    }

    /// Delete the char before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let cursor = self.cursor - 1;
        let next = self.without_char_at(cursor);
        self.replace(next, cursor);
    }

    /// Delete the char under the cursor.
    pub fn delete(&mut self) {
        if self.cursor >= self.value.chars().count() {
            return;
        }
        let next = self.without_char_at(self.cursor);
        self.replace(next, self.cursor);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    fn replace(&mut self, value: String, cursor: usize) {
        self.value = value;
        self.cursor = cursor;
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn without_char_at(&self, char_idx: usize) -> String {
        self.value
            .chars()
            .enumerate()
            .filter(|(i, _)| *i != char_idx)
            .map(|(_, c)| c)
            .collect()
    }
}

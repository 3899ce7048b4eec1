//! Text utilities for TUI rendering.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const TAB_WIDTH: usize = 4;

/// Display width of a string in terminal cells.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Wrap text to fit within a given width, keeping it verbatim.
///
/// Every `\n` starts a new line (a trailing newline yields a trailing empty
/// line) and runs of spaces are kept. Tabs are expanded to spaces since
/// terminals draw them inconsistently.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![];
    }

    let mut lines = Vec::new();

    for line in text.split('\n') {
        let line = line.replace('\t', &" ".repeat(TAB_WIDTH));
        if line.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_width = 0;

        for ch in line.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1);

            if current_width + ch_width > width && !current_line.is_empty() {
                lines.push(current_line);
                current_line = String::new();
                current_width = 0;
            }

            current_line.push(ch);
            current_width += ch_width;
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    lines
}

/// Pad a line with spaces up to `width` cells.
pub fn pad_to(line: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(line));
    format!("{}{}", line, " ".repeat(pad))
}

/// Index of the first char to show so that `cursor` fits in `width` cells.
pub fn visible_start(text: &str, cursor: usize, width: usize) -> usize {
    if width == 0 {
        return cursor;
    }

    let chars: Vec<char> = text.chars().collect();
    let mut start = cursor.min(chars.len());
    let mut used = 1; // the cursor cell itself

    while start > 0 {
        let w = UnicodeWidthChar::width(chars[start - 1]).unwrap_or(1);
        if used + w > width {
            break;
        }
        used += w;
        start -= 1;
    }
    start
}

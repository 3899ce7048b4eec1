//! Scrollable message list.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use toolchat_core::view::{Align, Block as ViewBlock, MessageView};

use super::theme;
use crate::utils::{display_width, pad_to, wrap_text};

/// Narrowest bubble worth drawing, in cells.
const MIN_BUBBLE_WIDTH: usize = 20;

/// Scroll position of the message list.
///
/// `offset == None` follows the bottom, so new messages stay in view until
/// the user scrolls up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollState {
    offset: Option<usize>,
    max: usize,
}

impl ScrollState {
    pub fn is_following(&self) -> bool {
        self.offset.is_none()
    }

    pub fn up(&mut self, lines: usize) {
        let current = self.offset.unwrap_or(self.max);
        self.offset = Some(current.saturating_sub(lines));
    }

    pub fn down(&mut self, lines: usize) {
        if let Some(current) = self.offset {
            let next = current.saturating_add(lines);
            self.offset = if next >= self.max { None } else { Some(next) };
        }
    }

    pub fn follow(&mut self) {
        self.offset = None;
    }

    /// Record the content size and return the first line to show.
    pub fn resolve(&mut self, total_lines: usize, visible_lines: usize) -> usize {
        self.max = total_lines.saturating_sub(visible_lines);
        match self.offset {
            Some(offset) => offset.min(self.max),
            None => self.max,
        }
    }
}

/// Message list widget.
pub struct ChatWidget<'a> {
    messages: &'a [MessageView],
}

impl<'a> ChatWidget<'a> {
    pub fn new(messages: &'a [MessageView]) -> Self {
        Self { messages }
    }

    pub fn render(self, frame: &mut Frame, area: Rect, scroll: &mut ScrollState) {
        let visible_height = area.height.saturating_sub(2) as usize;
        let text_width = area.width.saturating_sub(2) as usize;

        let all_lines = message_lines(self.messages, text_width);
        let total_lines = all_lines.len();
        let scroll_offset = scroll.resolve(total_lines, visible_height);

        let lines: Vec<Line> = all_lines
            .into_iter()
            .skip(scroll_offset)
            .take(visible_height)
            .collect();

        let title = if total_lines > visible_height {
            format!(
                " Messages [{}-{}/{}] ",
                scroll_offset + 1,
                (scroll_offset + visible_height).min(total_lines),
                total_lines
            )
        } else {
            " Messages ".to_string()
        };

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::muted())
                .title(title),
        );

        frame.render_widget(paragraph, area);
    }
}

/// Lay out every message as padded bubble rows followed by a blank line.
pub fn message_lines(messages: &[MessageView], width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return Vec::new();
    }

    let bubble_max = (width * 3 / 4).max(MIN_BUBBLE_WIDTH).min(width);
    let content_width = bubble_max.saturating_sub(2).max(1);

    let mut lines = Vec::new();
    for message in messages {
        let rows = bubble_rows(message, content_width);
        let inner = rows
            .iter()
            .map(|(text, _)| display_width(text))
            .max()
            .unwrap_or(0);
        let alignment = match message.align {
            Align::Right => Alignment::Right,
            Align::Left => Alignment::Left,
        };

        for (text, style) in rows {
            let cell = format!(" {} ", pad_to(&text, inner));
            lines.push(Line::from(Span::styled(cell, style)).alignment(alignment));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn bubble_rows(message: &MessageView, width: usize) -> Vec<(String, Style)> {
    let text_style = theme::bubble_style(message.bubble);
    let mut rows = Vec::new();

    for block in &message.blocks {
        match block {
            ViewBlock::Text(text) => {
                rows.extend(wrap_text(text, width).into_iter().map(|l| (l, text_style)));
            }
            ViewBlock::ToolCall { label, dump } => {
                rows.extend(
                    wrap_text(label, width)
                        .into_iter()
                        .map(|l| (l, theme::tool_label_style())),
                );
                rows.extend(
                    wrap_text(dump, width)
                        .into_iter()
                        .map(|l| (l, theme::tool_dump_style())),
                );
            }
        }
    }

    if rows.is_empty() {
        rows.push((String::new(), text_style));
    }
    rows
}

//! Main render function for the TUI.

use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use toolchat_core::view::{FormView, HeaderView, PageView, PaletteView};
use toolchat_core::ChatStatus;

use super::chat::{ChatWidget, ScrollState};
use super::theme;
use crate::utils::{display_width, visible_start};

/// Everything drawn in one frame.
pub struct Screen<'a> {
    pub view: &'a PageView,
    /// Input cursor, in chars.
    pub cursor: usize,
    pub status: &'a ChatStatus,
}

/// Render the entire UI.
pub fn render(frame: &mut Frame, screen: &Screen, scroll: &mut ScrollState) {
    let [header_area, messages_area, form_area, palette_area, footer_area] =
        Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());

    render_header(frame, header_area, &screen.view.header);
    ChatWidget::new(&screen.view.messages).render(frame, messages_area, scroll);
    render_form(frame, form_area, &screen.view.form, screen.cursor);
    render_palette(frame, palette_area, &screen.view.palette);
    render_footer(frame, footer_area, screen.status);
}

fn render_header(frame: &mut Frame, area: Rect, header: &HeaderView) {
    let text = vec![
        Line::from(Span::styled(header.title, theme::title())),
        Line::from(Span::styled(header.subtitle, theme::muted())),
    ];

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));

    frame.render_widget(paragraph, area);
}

fn render_form(frame: &mut Frame, area: Rect, form: &FormView, cursor: usize) {
    let [input_area, button_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(10)]).areas(area);

    let field_width = input_area.width.saturating_sub(2) as usize;

    let (content, cursor_x) = if form.value.is_empty() {
        (Line::from(Span::styled(form.placeholder, theme::muted())), 0)
    } else {
        let start = visible_start(&form.value, cursor, field_width);
        let before: String = form.value.chars().skip(start).take(cursor - start).collect();
        let shown: String = form.value.chars().skip(start).collect();
        (Line::from(shown), display_width(&before))
    };

    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::accent()))
            .title(" Message "),
    );
    frame.render_widget(input, input_area);

    let x = input_area.x + 1 + (cursor_x.min(field_width) as u16);
    frame.set_cursor_position(Position::new(x, input_area.y + 1));

    let button = Paragraph::new(form.submit_label)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::White)
                .bg(theme::accent())
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(button, button_area);
}

fn render_palette(frame: &mut Frame, area: Rect, palette: &PaletteView) {
    let mut spans = Vec::new();
    for (i, prompt) in palette.prompts.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("[F{}]", i + 1),
            Style::default().fg(theme::accent()).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {}", prompt)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::TOP)
                .title(format!(" {} ", palette.title)),
        );

    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, area: Rect, status: &ChatStatus) {
    let (label, color) = match status {
        ChatStatus::Ready => ("Ready".to_string(), Color::Green),
        ChatStatus::Submitted => ("Waiting for reply...".to_string(), Color::Yellow),
        ChatStatus::Streaming => ("Streaming...".to_string(), Color::Yellow),
        ChatStatus::Error(e) => (format!("Error: {}", e), Color::Red),
    };

    let help = " Enter: send | F1-F3: example prompt | Up/Down/PgUp/PgDn: scroll | Esc: quit ";

    let footer = Line::from(vec![
        Span::styled(label, Style::default().fg(color)),
        Span::raw(" | "),
        Span::styled(help, theme::muted()),
    ]);

    frame.render_widget(Paragraph::new(footer), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use toolchat_core::{render as render_page, Message};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_full_page_draws_every_section() {
        let messages = vec![Message::user_text("Hi there")];
        let view = render_page(&messages, "");
        let status = ChatStatus::Ready;
        let screen = Screen {
            view: &view,
            cursor: 0,
            status: &status,
        };

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        let mut scroll = ScrollState::default();
        terminal
            .draw(|frame| render(frame, &screen, &mut scroll))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("AI Chat with Tools"));
        assert!(text.contains("Hi there"));
        assert!(text.contains("Try: What's the weather in New York?"));
        assert!(text.contains("Send"));
        assert!(text.contains("[F1] What's the weather in Tokyo?"));
        assert!(text.contains("Ready"));
    }

    #[test]
    fn test_error_status_shows_in_footer() {
        let view = render_page(&[], "draft");
        let status = ChatStatus::Error("HTTP 500: boom".into());
        let screen = Screen {
            view: &view,
            cursor: 5,
            status: &status,
        };

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        let mut scroll = ScrollState::default();
        terminal
            .draw(|frame| render(frame, &screen, &mut scroll))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Error: HTTP 500: boom"));
        assert!(text.contains("draft"));
    }
}

//! Colors and styles.

use ratatui::style::{Color, Modifier, Style};

use toolchat_core::Bubble;

const ROSE_500: Color = Color::Rgb(244, 63, 94);
const ROSE_50: Color = Color::Rgb(255, 241, 242);
const ROSE_700: Color = Color::Rgb(190, 18, 60);
const ROSE_800: Color = Color::Rgb(159, 18, 57);
const GRAY_100: Color = Color::Rgb(243, 244, 246);
const GRAY_900: Color = Color::Rgb(17, 24, 39);

pub fn accent() -> Color {
    ROSE_500
}

pub fn bubble_style(bubble: Bubble) -> Style {
    match bubble {
        Bubble::User => Style::default().fg(Color::White).bg(ROSE_500),
        Bubble::Assistant => Style::default().fg(GRAY_900).bg(GRAY_100),
    }
}

pub fn tool_label_style() -> Style {
    Style::default()
        .fg(ROSE_800)
        .bg(ROSE_50)
        .add_modifier(Modifier::BOLD)
}

pub fn tool_dump_style() -> Style {
    Style::default().fg(ROSE_700).bg(ROSE_50)
}

pub fn muted() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn title() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

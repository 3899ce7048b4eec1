//! Terminal rendering.

pub mod chat;
mod render;
mod theme;

pub use chat::ScrollState;
pub use render::{render, Screen};

//! toolchat terminal UI.
//!
//! Chat with a tool-calling assistant over the UI message stream protocol.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use toolchat_client::{ChatConfig, HttpChatStore, DEFAULT_API_PATH, DEFAULT_BASE_URL};
use toolchat_core::ChatPage;

mod app;
mod event;
mod ui;
mod utils;

use app::App;

#[derive(Parser)]
#[command(name = "toolchat")]
#[command(about = "Terminal chat with tool calling")]
#[command(version)]
struct Cli {
    /// Base URL of the chat server
    #[arg(short, long, env = "TOOLCHAT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Path of the chat endpoint on the server
    #[arg(short, long, default_value = DEFAULT_API_PATH)]
    api: String,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, default_value = "/tmp/toolchat.log")]
    log_file: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Write logs to a file to avoid terminal interference
    if let Ok(file) = std::fs::File::create(&cli.log_file) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("toolchat=debug,toolchat_client=debug,toolchat_core=info")
        });
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_env_filter(filter)
            .with_ansi(false)
            .init();
    }

    let config = ChatConfig::new(cli.base_url, cli.api);
    info!(endpoint = %config.endpoint(), "Starting toolchat");

    let (store, backend) = HttpChatStore::new(&config)?;
    let store = Arc::new(store);

    // Spawn background thread with its own tokio runtime
    let bg_handle = std::thread::spawn(move || match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(backend.run()),
        Err(e) => error!(error = %e, "Failed to create tokio runtime"),
    });

    // Initialize terminal (enters alternate screen, enables raw mode)
    let terminal = ratatui::init();

    // Run UI loop on main thread
    let mut app = App::new(ChatPage::new(store.clone()));
    let result = app.run(terminal);

    // Restore terminal (exits alternate screen, disables raw mode)
    ratatui::restore();

    store.shutdown();
    let _ = bg_handle.join();

    info!("TUI shutdown complete");

    result.map_err(|e| e.into())
}

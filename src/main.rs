use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

mod app;
mod backend;
mod chat;
mod config;
mod handler;
mod plan;
mod session;
mod tui;
mod ui;

use app::App;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new()?;

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        app.poll_tasks().await;
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event).await?;
        }
    }
    Ok(())
}

// The TUI owns the terminal, so logs go to a file next to the config.
// Filter with WANDERLUST_LOG (tracing env-filter syntax), default "info".
fn init_logging() -> Result<()> {
    let log_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("wanderlust");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("wanderlust.log"))?;

    let filter = EnvFilter::try_from_env("WANDERLUST_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

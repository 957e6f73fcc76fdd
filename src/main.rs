//! DungeonMind - terminal client for an AI dungeon master
//!
//! A line-oriented chat client that keeps its transcript in session
//! storage, animates replies and talks to the DungeonMind backend.

mod api;
mod character;
mod command;
mod config;
mod db;
mod dice;
mod render;
mod runtime;
mod session;

use api::{DungeonMindClient, LoggingApi};
use character::load_character_panel;
use config::Config;
use db::Database;
use render::TerminalPresenter;
use runtime::{
    DatabaseStorage, Presenter, ProductionRuntime, TranscriptStore, VolatileStorage,
};
use session::SessionContext;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never mix with the message log
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dungeonmind=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(api_url = %config.api_url, session_id = %config.session_id, "Starting DungeonMind");

    let api = LoggingApi::new(DungeonMindClient::new(&config.api_url)?);

    if std::env::args().nth(1).as_deref() == Some("character") {
        let presenter = TerminalPresenter::new(std::io::stdout()).without_prompt();
        let panel = load_character_panel(&api).await;
        presenter.show_character(&panel).await;
        presenter.settle().await;
        return Ok(());
    }

    let storage = open_storage(&config)?;
    let presenter = TerminalPresenter::new(std::io::stdout())
        .with_type_delay(config.type_delay)
        .with_ellipsis_interval(config.ellipsis_interval);

    let (line_tx, line_rx) = mpsc::channel(32);
    spawn_stdin_reader(line_tx);

    let runtime: ProductionRuntime = ProductionRuntime::new(
        SessionContext::new(config.session_id),
        storage,
        Arc::new(api),
        Arc::new(presenter),
        line_rx,
    )
    .with_roll_delay(config.roll_delay);

    let exit = runtime.run().await;
    tracing::info!(exit = ?exit, "DungeonMind stopped");
    Ok(())
}

fn open_storage(config: &Config) -> Result<Arc<dyn TranscriptStore>, Box<dyn std::error::Error>> {
    if config.volatile {
        tracing::info!("Using volatile session storage");
        return Ok(Arc::new(VolatileStorage::new()));
    }

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening session storage");
    let db = Database::open(&config.db_path)?;
    Ok(Arc::new(DatabaseStorage::new(db)))
}

/// Feed stdin lines to the runtime from a plain thread. A blocked read on
/// it never holds up process exit.
fn spawn_stdin_reader(line_tx: mpsc::Sender<String>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read input");
                    break;
                }
            }
        }
    });
}

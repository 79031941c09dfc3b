//! Quill - console blog
//!
//! Interactive, in-memory blog: sign up, log in, and manage your own
//! posts from a numbered menu. Nothing is persisted between runs.

use std::io;

use quill_core::BlogStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod console;
mod menu;
mod render;
mod settings;

fn main() {
    // Logs go to stderr so they never interleave with the menu on stdout
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Quill");

    let config = match settings::load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut store = match BlogStore::from_config(&config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to initialize blog: {}", e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = console::Console::new(stdin.lock(), stdout.lock());

    if let Err(e) = console.run(&mut store) {
        tracing::error!("Console I/O failed: {}", e);
        std::process::exit(1);
    }
}

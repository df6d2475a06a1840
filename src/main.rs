//! columnar
//!
//! A column-based tiling window manager for X11, written in Rust.

mod config;
mod shared;
mod wm;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::wm::display::X11Display;
use crate::wm::error::log_warn;
use crate::wm::spawn;
use crate::wm::WindowManager;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "columnar=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--version" || arg == "-v") {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let init = args
        .iter()
        .position(|arg| arg == "--init")
        .map(|i| args.get(i + 1).context("--init expects a command"))
        .transpose()?;

    info!("Starting columnar {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    let display = X11Display::connect()?;
    let mut wm = WindowManager::new(display, config)?;
    log_warn(wm.scan_windows(), "adopt existing windows");

    if let Some(command) = init {
        info!("Running init command {:?}", command);
        spawn::spawn_program(command);
    }

    if let Err(e) = wm.run() {
        error!("Event loop failed: {:#}", e);
        return Err(e);
    }
    info!("Shutting down");
    Ok(())
}

//! Headless match-3 server (default binary).
//!
//! Loads settings, populates a session and serves it over the line-delimited
//! JSON adapter. Selections are applied one at a time on this thread.
//!
//! Settings come from the first argument or `MATCH3_SETTINGS`; without
//! either, the built-in defaults are used. `MATCH3_SEED` overrides the seed.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use match3::adapter::{Adapter, GameLoop};
use match3::core::Settings;
use match3::engine::Session;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings()?;
    let seed = seed_from_env();
    let session = Session::from_settings(&settings, seed).context("failed to build session")?;
    info!(
        width = settings.width,
        height = settings.height,
        seed = session.seed(),
        "session ready"
    );

    let mut game = GameLoop::new(session);
    let mut adapter = Adapter::start_from_env()?;

    while let Some(cmd) = adapter.recv_blocking() {
        for msg in game.apply(cmd) {
            adapter.send(msg);
        }
    }

    info!("adapter stopped, exiting");
    Ok(())
}

fn load_settings() -> Result<Settings> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MATCH3_SETTINGS").ok())
        .filter(|p| !p.trim().is_empty());

    match path {
        Some(path) => Settings::load(&path).with_context(|| format!("failed to load settings from {}", path)),
        None => Ok(Settings::default()),
    }
}

fn seed_from_env() -> Option<u32> {
    let raw = std::env::var("MATCH3_SEED").ok()?;
    match raw.trim().parse() {
        Ok(seed) => Some(seed),
        Err(_) => {
            warn!(value = %raw, "ignoring unparsable MATCH3_SEED");
            None
        }
    }
}

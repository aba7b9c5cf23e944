//! Log initialization.
//!
//! While the dashboard is running, stdout belongs to the renderer, so all
//! tracing output goes to a file: `$AGENTDECK_LOG` if set, otherwise
//! `~/.local/state/agentdeck/agentdeck.log`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

fn log_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("AGENTDECK_LOG") {
        return Ok(PathBuf::from(path));
    }
    let dir = dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .context("Failed to resolve a state directory for logs")?
        .join("agentdeck");
    Ok(dir.join("agentdeck.log"))
}

/// Install the global subscriber. `level` is an env-filter directive like
/// "info" or "agentdeck=debug"; `RUST_LOG` overrides it when set.
pub fn init(level: &str) -> Result<PathBuf> {
    let path = log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(path)
}

//! Logging init: file under the XDG state dir, stderr as fallback.

use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,skusync=debug"))
}

fn log_file() -> anyhow::Result<(PathBuf, fs::File)> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("skusync")?;
    let log_dir = xdg_dirs.get_state_home();
    fs::create_dir_all(&log_dir)?;
    let path = log_dir.join("skusync.log");
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Initialize structured logging to `~/.local/state/skusync/skusync.log`,
/// falling back to stderr when the state dir is unwritable.
pub fn init_logging() {
    match log_file() {
        Ok((path, file)) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
            tracing::info!("skusync logging initialized at {}", path.display());
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .init();
            tracing::warn!("log file unavailable ({}), logging to stderr", e);
        }
    }
}

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Base directory for client-side state (currently just logs).
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clarity")
}

/// Route tracing output to a log file.
///
/// The TUI owns the terminal while it runs, so nothing may be written to
/// stdout/stderr by the logging layer. CLI subcommands share the same sink to
/// keep their stdout reserved for actual output.
pub fn init() -> Result<()> {
    let log_dir = data_dir().join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let log_path = log_dir.join("clarity.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok(); // Ignore err if already set

    Ok(())
}

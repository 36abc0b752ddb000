use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.engage-report/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.engage-report/`
/// - `~/.engage-report/logs/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let report_dir = home.join(".engage-report");
    std::fs::create_dir_all(&report_dir)?;
    std::fs::create_dir_all(report_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// Log records go to stderr so they never mix with report output on stdout;
/// when `log_file` is given the same records are also appended there.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    // Map Python log-level names to tracing level names (tracing uses lowercase).
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" | "CRITICAL" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Attempt to locate session data near the working directory.
///
/// Checks the following paths in order and returns the first that exists:
/// 1. `./sessions.csv`
/// 2. `./data/sessions.csv`
/// 3. `./data/`
///
/// Returns `None` when none of them exist.
pub fn discover_data_path() -> Option<PathBuf> {
    discover_data_path_in(Path::new("."))
}

/// Same as [`discover_data_path`] but rooted at `base` (used for testing).
pub fn discover_data_path_in(base: &Path) -> Option<PathBuf> {
    let candidates = [
        base.join("sessions.csv"),
        base.join("data").join("sessions.csv"),
        base.join("data"),
    ];
    candidates.into_iter().find(|p| p.exists())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

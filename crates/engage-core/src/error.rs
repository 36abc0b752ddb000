use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the engagement report.
#[derive(Error, Debug)]
pub enum EngageError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV stream itself is malformed (broken quoting, bad rows).
    #[error("Failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The CSV header row lacks one or more required columns.
    #[error("CSV header in {path} is missing required columns: {}", columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    /// The expected data path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No CSV session files were found under the given directory.
    #[error("No CSV files found in {0}")]
    NoDataFiles(PathBuf),

    /// Duration bucket boundaries are malformed or not strictly ascending.
    #[error("Invalid bucket bounds: {0}")]
    InvalidBounds(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the engage crates.
pub type Result<T> = std::result::Result<T, EngageError>;

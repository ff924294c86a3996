use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesError {
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        path: PathBuf,
        /// CSV/spreadsheet files found by the directory scan, offered
        /// as alternatives. Empty when the scan found nothing.
        suggestions: Vec<PathBuf>,
    },

    #[error("Failed to load {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart rendering failed: {0}")]
    Chart(String),
}

//! Application error types.

use std::path::PathBuf;

use thiserror::Error;

/// Application-level errors for refgraph.
#[derive(Error, Debug)]
pub enum AppError {
    // Text acquisition errors
    #[error("Cannot extract text from {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    // Network acquisition errors
    #[error("Acquisition of {id} failed: {message}")]
    Acquisition { id: String, message: String },

    #[error("Acquisition of {id} timed out after {secs}s")]
    Timeout { id: String, secs: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Storage errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corpus root not found: {}", .0.display())]
    CorpusNotFound(PathBuf),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Builds a format error for a document that could not be turned into text.
    pub fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AppError::Format {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Builds an acquisition error for a frontier item.
    pub fn acquisition(id: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Acquisition {
            id: id.into(),
            message: message.into(),
        }
    }
}

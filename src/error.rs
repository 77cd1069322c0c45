//! Error types for the chat-insights library.
//!
//! This module provides custom error types using `thiserror` for better error handling
//! and more specific error messages throughout the analytics core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or analysing a chat corpus.
#[derive(Error, Debug)]
pub enum InsightsError {
    /// The archive could not be read: missing directory, unreadable file,
    /// malformed JSON or an unrepairable text field. Loading is aborted.
    #[error("Failed to read corpus at {}: {reason}", path.display())]
    CorpusRead {
        /// File or directory that failed
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// The configured owner never appears as a sender
    #[error("Owner \"{0}\" is not a sender in the loaded corpus")]
    OwnerNotFound(String),

    /// Unrecognized bucket size
    #[error("Unsupported granularity: {0} (expected hourly, daily, monthly or yearly)")]
    UnsupportedGranularity(String),

    /// Unrecognized distribution timeframe
    #[error("Unsupported timeframe: {0} (expected day-of-week or hour-of-day)")]
    UnsupportedTimeframe(String),

    /// Unrecognized report format
    #[error("Unsupported report format: {0} (expected json or csv)")]
    UnsupportedFormat(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV output errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

impl InsightsError {
    /// Build a [`InsightsError::CorpusRead`] for `path`.
    pub fn corpus_read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::CorpusRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience type alias for Result with InsightsError
pub type Result<T> = std::result::Result<T, InsightsError>;

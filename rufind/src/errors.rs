use std::path::PathBuf;
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur during search operations.
///
/// Only configuration-class failures cross the engine boundary: an invalid
/// root or a pattern that fails to compile aborts a search before any
/// traversal starts. Per-file failures (unreadable files, undecodable
/// content) and unreadable directories are absorbed as "no match" and never
/// surface here.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid search root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchError {
    pub fn invalid_root(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

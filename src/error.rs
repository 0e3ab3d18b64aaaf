//! Error types for the media organizer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media organizer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media organizer
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot access {path}: {message}")]
    FileAccess { path: PathBuf, message: String },

    #[error("Fingerprint computation failed for {path}: {message}")]
    Fingerprint { path: PathBuf, message: String },

    #[error("No free destination name for {path} after {attempts} attempts")]
    PathConflictExhausted { path: PathBuf, attempts: u32 },

    #[error("Failed to {operation} {source_path} -> {dest}: {message}")]
    Mutation {
        operation: &'static str,
        source_path: PathBuf,
        dest: PathBuf,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

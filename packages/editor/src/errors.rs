//! Error types for the editor

use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or writing the persisted document format
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid background URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid background image data: {0}")]
    InvalidImageData(String),

    #[error("Invalid emoji: {0}")]
    InvalidEmoji(String),

    #[error("Document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// True for every failure caused by the bytes themselves rather than
    /// the file system.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            CodecError::Malformed(_)
                | CodecError::InvalidUrl { .. }
                | CodecError::InvalidImageData(_)
                | CodecError::InvalidEmoji(_)
        )
    }
}

/// Failures retrieving background bytes. Absorbed by the resolver into a
/// failed fetch status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server responded with status {0}")]
    Status(u16),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Corrupt file: {0}")]
    CorruptFile(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

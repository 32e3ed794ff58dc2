//! Error types shared across Reelcut crates.

use std::path::PathBuf;

/// Which media stream an operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Audio,
    Video,
    /// Either stream satisfies the operation.
    Any,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Audio => f.write_str("audio"),
            StreamKind::Video => f.write_str("video"),
            StreamKind::Any => f.write_str("audio/video"),
        }
    }
}

/// Top-level error type for Reelcut operations.
#[derive(Debug, thiserror::Error)]
pub enum ReelcutError {
    #[error("Missing {stream} stream for filter \"{filter}\"")]
    MissingStream { stream: StreamKind, filter: String },

    #[error("Invalid options for filter \"{filter}\": {message}")]
    Validation { filter: String, message: String },

    #[error("Invalid output path: {message}")]
    InvalidOutputPath { message: String },

    #[error("Invalid file extension: {extension:?}")]
    InvalidExtension { extension: String },

    #[error("Unrecognized output format for extension: {extension}")]
    UnknownFormat { extension: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Error getting metadata: {message}")]
    Metadata { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("FFmpeg command failed: {command}\nFFmpeg stderr:\n{stderr}")]
    Command { command: String, stderr: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ReelcutError.
pub type ReelcutResult<T> = Result<T, ReelcutError>;

impl ReelcutError {
    pub fn missing_stream(stream: StreamKind, filter: impl Into<String>) -> Self {
        Self::MissingStream {
            stream,
            filter: filter.into(),
        }
    }

    pub fn validation(filter: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            filter: filter.into(),
            message: msg.into(),
        }
    }

    pub fn invalid_output_path(msg: impl Into<String>) -> Self {
        Self::InvalidOutputPath {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata {
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
        }
    }

    /// Whether the error was raised before any external process ran.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MissingStream { .. }
                | Self::Validation { .. }
                | Self::InvalidOutputPath { .. }
                | Self::InvalidExtension { .. }
                | Self::UnknownFormat { .. }
                | Self::Config { .. }
        )
    }
}

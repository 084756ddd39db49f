//! Error types for media toolchain operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from probing, decoding, or encoding media files.
#[derive(Error, Debug)]
pub enum MediaError {
    /// A required toolchain binary is missing from PATH.
    #[error("{tool} not found, please install ffmpeg and add it to your PATH")]
    ToolNotFound { tool: String },

    /// Source file does not exist.
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),

    /// An external command exited with a non-zero status.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// Toolchain output could not be parsed.
    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// A camera has no usable audio track.
    #[error("No audio track in camera '{camera}'")]
    NoAudioTrack { camera: String },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl MediaError {
    /// Create a command failed error.
    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.into(),
        }
    }
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

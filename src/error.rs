//! Error types for Zipline
//!
//! All modules use `ZiplineResult<T>` as their return type. Each fatal
//! error class maps to a stable process exit code via [`ZiplineError::exit_code`].

use crate::entrypoint::Platform;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Zipline operations
pub type ZiplineResult<T> = Result<T, ZiplineError>;

/// All errors that can occur in Zipline
#[derive(Error, Debug)]
pub enum ZiplineError {
    // Fetch errors
    #[error("Failed to fetch bundle from {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    // Integrity errors
    #[error("SHA256 mismatch. Got {computed}, expected {expected}")]
    IntegrityMismatch { computed: String, expected: String },

    // Entrypoint errors
    #[error("No runnable entrypoint for platform {platform} in {install_dir}")]
    NoEntrypoint {
        platform: Platform,
        install_dir: PathBuf,
    },

    // Extraction errors
    #[error("Archive entry escapes destination directory: {entry}")]
    ArchivePathEscape { entry: String },

    #[error("Invalid archive: {reason}")]
    ArchiveInvalid { reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Failed to execute {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Child process terminated without an exit code")]
    ProcessSignaled,
}

impl ZiplineError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for the given URL
    pub fn network(url: impl Into<String>, source: ureq::Error) -> Self {
        Self::Network {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Map the error taxonomy to the launcher's exit codes.
    ///
    /// 1 = network failure, 2 = integrity mismatch, 3 = no entrypoint,
    /// 4 = any other launcher failure. Child exit codes pass through
    /// separately on the success path.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Network { .. } => 1,
            Self::IntegrityMismatch { .. } => 2,
            Self::NoEntrypoint { .. } => 3,
            _ => 4,
        }
    }
}

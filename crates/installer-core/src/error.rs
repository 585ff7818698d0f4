//! Error taxonomy shared by every installer stage

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the installer
pub type Result<T, E = InstallError> = std::result::Result<T, E>;

/// Every failure the installer can surface to the top-level runner.
///
/// Only the `Display` text reaches the end user; the variant decides the
/// exit code and whether anything was left on disk.
#[derive(Debug, Error)]
pub enum InstallError {
    /// Bad arguments or flag combinations, detected before any process runs
    #[error("{0}")]
    Usage(String),

    /// The target path or project is not in the expected state
    #[error("{0}")]
    Precondition(String),

    /// A spawned command exited non-zero at a stage where that is fatal
    #[error("{message}")]
    ProcessFailed { message: String, exit_code: i32 },

    /// A later stage failed after the base project was installed
    #[error("{message}")]
    PartialInstall { message: String, preserved: PathBuf },

    /// Marketplace or download endpoint unreachable or malformed
    #[error("{0}")]
    Service(String),

    /// Interactive input could not be read
    #[error("Unable to read input: {0}")]
    Prompt(#[source] std::io::Error),

    /// The user pressed Ctrl+C inside a prompt
    #[error("Installation cancelled.")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InstallError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }

    pub fn process(message: impl Into<String>, exit_code: i32) -> Self {
        Self::ProcessFailed {
            message: message.into(),
            exit_code,
        }
    }

    /// Map an I/O error raised by a prompt, treating an interrupt as a cancellation
    pub fn from_prompt(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::Interrupted {
            Self::Cancelled
        } else {
            Self::Prompt(err)
        }
    }

    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cancelled => 130,
            _ => 1,
        }
    }
}

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all managed Cloud SDK operations.
#[derive(Debug, Error, Diagnostic)]
pub enum CloudSdkError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A file that must not be overwritten is already present.
    #[error("File already exists: {}", path.display())]
    #[diagnostic(help("Remove the file before retrying"))]
    AlreadyExists { path: PathBuf },

    /// The running task was asked to stop at a cancellation checkpoint.
    #[error("{stage} cancelled")]
    Cancelled { stage: String },

    /// The archive extension is neither `.zip` nor `.tar.gz`.
    #[error("Unknown archive type: {}", path.display())]
    UnknownArchiveType { path: PathBuf },

    /// An archive entry would be written outside the extraction root.
    #[error("Blocked extracting '{entry}' outside of {}", destination.display())]
    PathTraversal { entry: String, destination: PathBuf },

    /// Network request or download failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// A pipeline stage reported success but its expected artifact is absent.
    #[error("{message}: {}", path.display())]
    Installer { message: String, path: PathBuf },

    /// An external command finished with a non-zero exit code.
    #[error("Process exited with code {code}")]
    CommandExit { code: i32 },

    /// An argument was rejected before any work started.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The operation is not allowed in the current state.
    #[error("Illegal state: {message}")]
    IllegalState { message: String },

    /// The host OS or architecture has no Cloud SDK distribution.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// Invalid or unreadable configuration file.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.cloudsdk/config.toml for syntax errors"))]
    Config { message: String },
}

impl CloudSdkError {
    /// Build an [`CloudSdkError::Installer`] naming the expected path.
    pub fn installer(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Installer {
            message: message.into(),
            path: path.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Convenience alias used by the library crates.
pub type SdkResult<T> = Result<T, CloudSdkError>;

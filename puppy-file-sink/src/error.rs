//! Error types for file sink operations.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using FileSinkError.
pub type Result<T> = std::result::Result<T, FileSinkError>;

/// Errors surfaced by sink construction, deletion and configuration.
///
/// Per-write failures never show up here. They are reported through
/// `tracing` and the write is dropped.
#[derive(Error, Debug)]
pub enum FileSinkError {
    /// The target path denotes a directory.
    #[error("'{path}' is a directory, not a file")]
    NotAFile { path: PathBuf },

    /// The parent directory of the target could not be created.
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The target file did not exist and could not be created.
    #[error("failed to create file '{path}': {source}")]
    FileCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The target file could not be opened for writing.
    #[error("failed to open '{path}' for writing: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be removed.
    #[error("failed to delete '{path}': {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sink configuration file could not be loaded.
    #[error("invalid sink configuration: {message}")]
    Config { message: String },
}

impl FileSinkError {
    /// Create a NotAFile error.
    pub fn not_a_file(path: impl Into<PathBuf>) -> Self {
        Self::NotAFile { path: path.into() }
    }

    /// Create a DirectoryCreationFailed error.
    pub fn directory_creation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a FileCreationFailed error.
    pub fn file_creation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create an OpenFailed error.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OpenFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a DeleteFailed error.
    pub fn delete(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DeleteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The path this error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotAFile { path }
            | Self::DirectoryCreationFailed { path, .. }
            | Self::FileCreationFailed { path, .. }
            | Self::OpenFailed { path, .. }
            | Self::DeleteFailed { path, .. } => Some(path),
            Self::Config { .. } => None,
        }
    }
}

impl From<figment::Error> for FileSinkError {
    fn from(error: figment::Error) -> Self {
        Self::config(error.to_string())
    }
}

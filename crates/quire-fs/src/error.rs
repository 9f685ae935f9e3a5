// error.rs — Error types for the trusted file service.

use std::path::PathBuf;

use quire_protocol::{Failure, FailureCategory};
use thiserror::Error;

use crate::picker::PickerError;

/// Errors that can occur inside a file service operation.
///
/// These never cross the bridge as-is: [`FsServiceError::to_failure`] turns
/// them into a structured [`Failure`] at the operation boundary.
#[derive(Debug, Error)]
pub enum FsServiceError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file exists but is not valid UTF-8 text.
    #[error("'{path}' is not valid UTF-8 text")]
    NotText { path: PathBuf },

    /// A directory operation was given something that is not a directory.
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    /// A file operation was given a directory.
    #[error("'{path}' is a directory, not a file")]
    NotAFile { path: PathBuf },

    /// The path is already taken by something that is not a directory.
    #[error("'{path}' already exists and is not a directory")]
    PathOccupied { path: PathBuf },

    /// The picker itself failed (not a user cancellation).
    #[error("picker error: {0}")]
    Picker(#[from] PickerError),
}

impl FsServiceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FsServiceError::IoError {
            path: path.into(),
            source,
        }
    }

    /// The failure category this error is reported under.
    pub fn category(&self) -> FailureCategory {
        match self {
            FsServiceError::IoError { source, .. } => FailureCategory::from_io_kind(source.kind()),
            FsServiceError::NotText { .. } => FailureCategory::InvalidData,
            FsServiceError::NotADirectory { .. } => FailureCategory::NotADirectory,
            FsServiceError::NotAFile { .. } => FailureCategory::NotAFile,
            FsServiceError::PathOccupied { .. } => FailureCategory::AlreadyExists,
            FsServiceError::Picker(_) => FailureCategory::Internal,
        }
    }

    /// Convert to the structured failure payload that crosses the bridge.
    pub fn to_failure(&self, message: &str) -> Failure {
        Failure::new(self.category(), self.to_string()).with_message(message)
    }
}

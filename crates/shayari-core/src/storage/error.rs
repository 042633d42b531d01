//! Backend error handling
//!
//! Classifies failures of the underlying key/value store so that the
//! persistence layer can tell a full store apart from everything else.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](super::KeyValueStore) backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// The write would exceed the store's capacity
    #[error("Storage quota exceeded: writing '{key}' needs {required} characters, {available} available")]
    QuotaExceeded {
        key: String,
        required: usize,
        available: usize,
    },

    /// The store cannot be used at all
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    /// Disk is full (reported by the operating system)
    #[error("Disk full while writing to '{path}'. Free up disk space and try again.")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read a stored value
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a stored value
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Key cannot be mapped onto the backend
    #[error("Invalid key '{key}'")]
    InvalidKey { key: String },
}

impl BackendError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => BackendError::PermissionDenied {
                path,
                source: error,
            },
            _ if is_disk_full_error(&error) => BackendError::DiskFull {
                path,
                source: error,
            },
            _ => BackendError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Whether this failure means the store has run out of room
    pub fn is_capacity_exhausted(&self) -> bool {
        matches!(
            self,
            BackendError::QuotaExceeded { .. } | BackendError::DiskFull { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            BackendError::QuotaExceeded { .. } => {
                Some("Export your collection and remove entries you no longer need.")
            }
            BackendError::DiskFull { .. } => Some("Free up disk space and try again."),
            BackendError::PermissionDenied { .. } => {
                Some("Check file and directory permissions for the data directory.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

//! Error types for collection operations
//!
//! Validation and lookup failures are rejected before anything changes.
//! Import failures are all-or-nothing up to the final save; a failed
//! final save is the one case where memory and storage disagree.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by the repository, import and export
#[derive(Error, Debug)]
pub enum ShayariError {
    /// A required field is missing or blank
    #[error("Please fill in all required fields: '{field}' cannot be empty")]
    Validation { field: &'static str },

    /// No item has the given ID
    #[error("Item not found: {id}")]
    NotFound { id: Uuid },

    /// Import text is not valid JSON
    #[error("Failed to parse file: {0}")]
    Parse(#[source] serde_json::Error),

    /// Import JSON does not have the snapshot shape
    #[error("Invalid file format: {0}")]
    Format(String),

    /// Import contained no usable items
    #[error("No valid items found in the file")]
    EmptyImport,

    /// The store rejected a write that the operation depends on
    #[error("Failed to save '{key}' to storage. Reload the collection to resync.")]
    Persistence { key: String },

    /// Snapshot could not be encoded
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// Reading or writing a snapshot file failed
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ShayariError {
    /// Whether in-memory state may now differ from storage
    pub fn requires_reload(&self) -> bool {
        matches!(self, ShayariError::Persistence { .. })
    }
}

/// Result type for collection operations
pub type Result<T> = std::result::Result<T, ShayariError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = ShayariError::Validation { field: "title" };
        assert!(err.to_string().contains("title"));
        assert!(!err.requires_reload());
    }

    #[test]
    fn test_persistence_requires_reload() {
        let err = ShayariError::Persistence {
            key: "shayari_collection".to_string(),
        };
        assert!(err.requires_reload());
        assert!(err.to_string().contains("shayari_collection"));
    }

    #[test]
    fn test_parse_error_wraps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ShayariError::Parse(source);
        assert!(err.to_string().starts_with("Failed to parse file"));
        assert!(std::error::Error::source(&err).is_some());
    }
}

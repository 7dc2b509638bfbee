//! Error types for taskzen JSON store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during `JsonFileStore` operations.
#[derive(Error, Debug)]
pub enum JsonStoreError {
    /// Namespace key cannot be used as a file name.
    #[error("Invalid namespace: {0:?}")]
    InvalidNamespace(String),

    /// Stored document exists but is not a valid task list.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        /// Document that failed to parse.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize tasks to JSON.
    #[error("Failed to serialize tasks: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Failed to move the freshly written document into place.
    #[error("Failed to replace {}: {source}", path.display())]
    Persist {
        /// Destination document.
        path: PathBuf,
        /// Underlying rename error.
        #[source]
        source: std::io::Error,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

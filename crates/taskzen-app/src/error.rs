//! Errors reported by task store operations.

use taskzen_core::TaskId;
use thiserror::Error;

/// Rejection of a single store operation. The collection is unchanged whenever
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Input failed a structural precondition.
    #[error("invalid task: {0}")]
    Validation(String),
    /// No task has the given identifier.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// A reorder index lies outside the collection.
    #[error("index {index} is out of range for {len} tasks")]
    OutOfRange {
        /// Rejected index.
        index: usize,
        /// Collection size at the time of the call.
        len: usize,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

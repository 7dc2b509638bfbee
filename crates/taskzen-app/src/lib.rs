//! Application layer for taskzen.
//!
//! This crate owns the canonical task collection ([`TaskStore`]), the single
//! step undo buffer, persistence adapters, configuration, and the
//! [`TaskService`] façade a presentation layer talks to.

pub mod clock;
pub mod config;
pub mod error;
pub mod notice;
pub mod persistence;
pub mod service;
pub mod task_patch;
pub mod task_store;
pub mod undo;

// Re-exports for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{EngineConfig, StorageConfig, TasksConfig};
pub use error::{StoreError, StoreResult};
pub use notice::Notice;
pub use persistence::{MemoryPersistence, PersistError, TaskPersistence};
pub use service::TaskService;
pub use task_patch::{DescriptionPatch, DueDatePatch, TaskUpdate};
pub use task_store::{DEFAULT_NAMESPACE, TaskStore};
pub use undo::UndoBuffer;

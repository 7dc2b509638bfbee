//! Storage abstraction for the canonical task collection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use taskzen_core::Task;
use taskzen_store_json::{JsonFileStore, JsonStoreError};
use thiserror::Error;

/// Failure reported by a persistence backend.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The JSON file store failed.
    #[error(transparent)]
    Json(#[from] JsonStoreError),
    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal key-value contract required by [`TaskStore`](crate::TaskStore).
pub trait TaskPersistence {
    /// Load the collection saved under `namespace`; `Ok(None)` when nothing
    /// has been saved yet.
    ///
    /// # Errors
    /// Returns a backend-specific error when the data cannot be read or decoded.
    fn load(&self, namespace: &str) -> Result<Option<Vec<Task>>, PersistError>;

    /// Replace the collection saved under `namespace`.
    ///
    /// # Errors
    /// Returns a backend-specific error when the write fails.
    fn save(&self, namespace: &str, tasks: &[Task]) -> Result<(), PersistError>;
}

impl TaskPersistence for JsonFileStore {
    fn load(&self, namespace: &str) -> Result<Option<Vec<Task>>, PersistError> {
        Ok(Self::load(self, namespace)?)
    }

    fn save(&self, namespace: &str, tasks: &[Task]) -> Result<(), PersistError> {
        Ok(Self::save(self, namespace, tasks)?)
    }
}

impl<S> TaskPersistence for &S
where
    S: TaskPersistence + ?Sized,
{
    fn load(&self, namespace: &str) -> Result<Option<Vec<Task>>, PersistError> {
        (*self).load(namespace)
    }

    fn save(&self, namespace: &str, tasks: &[Task]) -> Result<(), PersistError> {
        (*self).save(namespace, tasks)
    }
}

/// In-process backend. Clones share the same documents, so a handle kept by
/// the caller observes every save made through the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<String, Vec<Task>>,
    saves: usize,
    fail_loads: bool,
    fail_saves: bool,
}

impl MemoryPersistence {
    /// Empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with `tasks` under `namespace`.
    #[must_use]
    pub fn with_tasks(namespace: impl Into<String>, tasks: Vec<Task>) -> Self {
        let backend = Self::default();
        backend.state().documents.insert(namespace.into(), tasks);
        backend
    }

    /// Copy of the collection saved under `namespace`.
    #[must_use]
    pub fn stored(&self, namespace: &str) -> Option<Vec<Task>> {
        self.state().documents.get(namespace).cloned()
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.state().saves
    }

    /// Make subsequent loads fail (simulates unreadable storage).
    pub fn fail_loads(&self, fail: bool) {
        self.state().fail_loads = fail;
    }

    /// Make subsequent saves fail (simulates quota or I/O errors).
    pub fn fail_saves(&self, fail: bool) {
        self.state().fail_saves = fail;
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskPersistence for MemoryPersistence {
    fn load(&self, namespace: &str) -> Result<Option<Vec<Task>>, PersistError> {
        let state = self.state();
        if state.fail_loads {
            return Err(PersistError::Unavailable(format!("cannot read '{namespace}'")));
        }
        Ok(state.documents.get(namespace).cloned())
    }

    fn save(&self, namespace: &str, tasks: &[Task]) -> Result<(), PersistError> {
        let mut state = self.state();
        if state.fail_saves {
            return Err(PersistError::Unavailable(format!("cannot write '{namespace}'")));
        }
        state.documents.insert(namespace.to_owned(), tasks.to_vec());
        state.saves += 1;
        Ok(())
    }
}

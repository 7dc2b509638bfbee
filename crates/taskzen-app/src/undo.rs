//! Capacity-one holding area for the most recently deleted task.

use taskzen_core::Task;

/// Holds zero or one task. Storing a new task discards the previous one; there
/// is no history.
#[derive(Debug, Clone, Default)]
pub struct UndoBuffer {
    slot: Option<Task>,
}

impl UndoBuffer {
    /// Empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { slot: None }
    }

    /// Store `task`, returning the task it displaced (now permanently lost to
    /// the engine).
    pub fn put(&mut self, task: Task) -> Option<Task> {
        self.slot.replace(task)
    }

    /// Remove and return the buffered task.
    pub fn take(&mut self) -> Option<Task> {
        self.slot.take()
    }

    /// Borrow the buffered task without removing it.
    #[must_use]
    pub const fn peek(&self) -> Option<&Task> {
        self.slot.as_ref()
    }

    /// Returns true when there is nothing to restore.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

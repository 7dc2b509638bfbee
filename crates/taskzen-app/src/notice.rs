//! Transient, non-blocking messages for the presentation layer.

use std::fmt;

use taskzen_core::TaskId;

/// Something the user should be told about after an operation.
///
/// Notices are queued by the store and drained with
/// [`TaskStore::take_notices`](crate::TaskStore::take_notices).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A task was created.
    TaskAdded {
        /// New task.
        id: TaskId,
    },
    /// A task was deleted and can be restored until the next delete.
    TaskDeleted {
        /// Deleted task.
        id: TaskId,
        /// Its title, for display.
        title: String,
    },
    /// The buffered task was put back.
    TaskRestored {
        /// Restored task.
        id: TaskId,
    },
    /// Restore was requested with an empty undo buffer.
    NothingToUndo,
    /// The stored collection could not be read and was treated as empty.
    LoadFailed {
        /// Underlying error.
        message: String,
    },
    /// Saving the collection failed; in-memory state is unaffected.
    PersistFailed {
        /// Underlying error.
        message: String,
    },
}

impl Notice {
    /// Short headline.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::TaskAdded { .. } => "Task added",
            Self::TaskDeleted { .. } => "Task deleted",
            Self::TaskRestored { .. } => "Task restored",
            Self::NothingToUndo => "Nothing to undo",
            Self::LoadFailed { .. } => "Could not load tasks",
            Self::PersistFailed { .. } => "Could not save tasks",
        }
    }

    /// Whether the presentation should offer an "undo" action with this notice.
    #[must_use]
    pub const fn offers_undo(&self) -> bool {
        matches!(self, Self::TaskDeleted { .. })
    }

    /// Returns true for failure notices.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::LoadFailed { .. } | Self::PersistFailed { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskAdded { .. } => write!(f, "{}: Your task has been created successfully.", self.title()),
            Self::TaskDeleted { title, .. } => write!(f, "{}: \"{title}\". You can undo this action.", self.title()),
            Self::TaskRestored { .. } => write!(f, "{}: Your task has been recovered.", self.title()),
            Self::NothingToUndo => f.write_str(self.title()),
            Self::LoadFailed { message } | Self::PersistFailed { message } => {
                write!(f, "{}: {message}", self.title())
            }
        }
    }
}

use taskzen_core::{Priority, Task, TaskStatus};
use time::OffsetDateTime;

use crate::error::{StoreError, StoreResult};

/// Patch for the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionPatch {
    /// Overwrite with a new text.
    Set {
        /// Description body.
        description: String,
    },
    /// Remove the description.
    Clear,
}

/// Patch for the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDatePatch {
    /// Overwrite with a new deadline.
    Set {
        /// Deadline.
        due: OffsetDateTime,
    },
    /// Remove the deadline.
    Clear,
}

/// Partial task update. Every `None` field leaves the task's value untouched.
///
/// The identifier, creation time, and rank are not patchable; rank only
/// changes through [`TaskStore::reorder`](crate::TaskStore::reorder).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    /// Overwrite the title (must not be empty).
    pub title: Option<String>,
    /// Patch applied to the description.
    pub description: Option<DescriptionPatch>,
    /// Overwrite the priority.
    pub priority: Option<Priority>,
    /// Overwrite the status; `completed_at` follows unless supplied below.
    pub status: Option<TaskStatus>,
    /// Replace the tag list.
    pub tags: Option<Vec<String>>,
    /// Patch applied to the due date.
    pub due_date: Option<DueDatePatch>,
    /// Explicit completion time; only valid when the task ends up completed.
    pub completed_at: Option<OffsetDateTime>,
}

impl TaskUpdate {
    /// Empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(DescriptionPatch::Set {
            description: description.into(),
        });
        self
    }

    /// Remove the description.
    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = Some(DescriptionPatch::Clear);
        self
    }

    /// Set the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the status.
    #[must_use]
    pub const fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Replace the tags.
    #[must_use]
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Set the due date.
    #[must_use]
    pub const fn due_date(mut self, due: OffsetDateTime) -> Self {
        self.due_date = Some(DueDatePatch::Set { due });
        self
    }

    /// Remove the due date.
    #[must_use]
    pub const fn clear_due_date(mut self) -> Self {
        self.due_date = Some(DueDatePatch::Clear);
        self
    }

    /// Set an explicit completion time.
    #[must_use]
    pub const fn completed_at(mut self, at: OffsetDateTime) -> Self {
        self.completed_at = Some(at);
        self
    }

    /// Returns true when the update would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.tags.is_none()
            && self.due_date.is_none()
            && self.completed_at.is_none()
    }

    /// Check the update against `current` without modifying anything.
    pub(crate) fn validate(&self, current: &Task) -> StoreResult<()> {
        if self.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return Err(StoreError::Validation("title must not be empty".into()));
        }
        let resulting_status = self.status.unwrap_or(current.status);
        if self.completed_at.is_some() && resulting_status != TaskStatus::Completed {
            return Err(StoreError::Validation(
                "completed_at can only be set on a completed task".into(),
            ));
        }
        Ok(())
    }

    /// Apply every present field. Callers must have run [`Self::validate`].
    pub(crate) fn apply(self, task: &mut Task, now: OffsetDateTime) {
        if let Some(title) = self.title {
            task.title = title;
        }
        match self.description {
            Some(DescriptionPatch::Set { description }) => task.description = Some(description),
            Some(DescriptionPatch::Clear) => task.description = None,
            None => {}
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.set_status(status, now);
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        match self.due_date {
            Some(DueDatePatch::Set { due }) => task.due_date = Some(due),
            Some(DueDatePatch::Clear) => task.due_date = None,
            None => {}
        }
        if let Some(at) = self.completed_at {
            task.completed_at = Some(at);
        }
    }
}

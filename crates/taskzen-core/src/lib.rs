//! Domain types, filtering, and statistics for taskzen.

/// Filter criteria and the filtered-view projection.
pub mod filter;
/// Identifier types.
pub mod id;
/// Priority and status enumerations.
pub mod state;
/// Summary counts over a task collection.
pub mod stats;
/// Case-insensitive search matching.
pub mod text_matcher;

pub use crate::filter::{FilterCriteria, PriorityFilter, StatusFilter, TagFilter, all_tags, filter_tasks};
pub use crate::id::TaskId;
pub use crate::state::{ParseTokenError, Priority, TaskStatus};
pub use crate::stats::TaskStats;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single trackable work item.
///
/// `order` is the task's display rank within the whole collection. The owning
/// store keeps the ranks dense (`0..N`), so nothing outside the store should
/// assign it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identifier.
    pub id: TaskId,
    /// Display text; never empty.
    pub title: String,
    /// Optional free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Urgency.
    pub priority: Priority,
    /// Completion state.
    pub status: TaskStatus,
    /// Labels in display order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional deadline.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    /// Creation timestamp, fixed once set.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Set exactly while `status` is [`TaskStatus::Completed`].
    #[serde(default, skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    /// Display rank.
    pub order: usize,
}

impl Task {
    /// Returns true when the task is completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, TaskStatus::Completed)
    }

    /// Returns true when the task carries `tag` (exact match).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    /// A pending task whose due date lies strictly before `now`.
    #[must_use]
    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        !self.is_completed() && self.due_date.is_some_and(|due| due < now)
    }

    /// Set `status`, keeping `completed_at` in step with it.
    ///
    /// Moving into [`TaskStatus::Completed`] stamps `now`; moving back to
    /// pending clears the stamp. Setting the current status again is a no-op.
    pub fn set_status(&mut self, status: TaskStatus, now: OffsetDateTime) {
        if self.status == status {
            return;
        }
        self.status = status;
        self.completed_at = match status {
            TaskStatus::Completed => Some(now),
            TaskStatus::Pending => None,
        };
    }
}

/// Caller-supplied fields for a new task.
///
/// Everything except the identifier, creation time, and rank, which the store
/// assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Display text.
    pub title: String,
    /// Optional free text.
    pub description: Option<String>,
    /// Urgency.
    pub priority: Priority,
    /// Initial status.
    pub status: TaskStatus,
    /// Labels in display order.
    pub tags: Vec<String>,
    /// Optional deadline.
    pub due_date: Option<OffsetDateTime>,
    /// Completion time for drafts created already completed.
    pub completed_at: Option<OffsetDateTime>,
}

impl TaskDraft {
    /// Start a pending, medium priority draft.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
            status: TaskStatus::default(),
            tags: Vec::new(),
            due_date: None,
            completed_at: None,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the initial status.
    #[must_use]
    pub const fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Replace the tag list.
    #[must_use]
    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the due date.
    #[must_use]
    pub const fn due_date(mut self, due: OffsetDateTime) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Materialize the draft into a task.
    ///
    /// `completed_at` follows the status: a pending draft never carries one and a
    /// completed draft without one is stamped with `now`.
    #[must_use]
    pub fn into_task(self, id: TaskId, now: OffsetDateTime, order: usize) -> Task {
        let completed_at = match self.status {
            TaskStatus::Completed => Some(self.completed_at.unwrap_or(now)),
            TaskStatus::Pending => None,
        };
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: self.status,
            tags: self.tags,
            due_date: self.due_date,
            created_at: now,
            completed_at,
            order,
        }
    }
}

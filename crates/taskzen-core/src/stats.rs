use serde::Serialize;
use time::OffsetDateTime;

use crate::{Priority, Task, TaskStatus};

/// Summary counts over a whole task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// Every task.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Pending tasks.
    pub pending: usize,
    /// Pending tasks with urgent priority.
    pub urgent: usize,
    /// Pending tasks past their due date.
    pub overdue: usize,
}

impl TaskStats {
    /// Count `tasks` using the current UTC time for the overdue check.
    #[must_use]
    pub fn compute(tasks: &[Task]) -> Self {
        Self::compute_at(tasks, OffsetDateTime::now_utc())
    }

    /// Count `tasks`, treating `now` as the current instant.
    #[must_use]
    pub fn compute_at(tasks: &[Task], now: OffsetDateTime) -> Self {
        tasks.iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Pending => {
                    stats.pending += 1;
                    if task.priority == Priority::Urgent {
                        stats.urgent += 1;
                    }
                    if task.is_overdue(now) {
                        stats.overdue += 1;
                    }
                }
            }
            stats
        })
    }
}

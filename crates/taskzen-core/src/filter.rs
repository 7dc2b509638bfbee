use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::state::ParseTokenError;
use crate::text_matcher::TextMatcher;
use crate::{Priority, Task, TaskStatus};

const ALL_TOKEN: &str = "all";

/// Status restriction of the filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// No restriction.
    #[default]
    All,
    /// Only tasks with this status.
    Only(TaskStatus),
}

impl StatusFilter {
    fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => task.status == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_TOKEN),
            Self::Only(status) => status.fmt(f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL_TOKEN) {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl From<TaskStatus> for StatusFilter {
    fn from(status: TaskStatus) -> Self {
        Self::Only(status)
    }
}

/// Priority restriction of the filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    /// No restriction.
    #[default]
    All,
    /// Only tasks with this priority.
    Only(Priority),
}

impl PriorityFilter {
    fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(priority) => task.priority == priority,
        }
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_TOKEN),
            Self::Only(priority) => priority.fmt(f),
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL_TOKEN) {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl From<Priority> for PriorityFilter {
    fn from(priority: Priority) -> Self {
        Self::Only(priority)
    }
}

/// Tag restriction of the filtered view. Tag comparison is exact.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    /// No restriction.
    #[default]
    All,
    /// Only tasks carrying this tag.
    Tag(String),
}

impl TagFilter {
    fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Tag(tag) => task.has_tag(tag),
        }
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_TOKEN),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

impl From<&str> for TagFilter {
    /// `"all"` (the value a tag picker reports for "no tag") clears the filter.
    fn from(value: &str) -> Self {
        if value == ALL_TOKEN {
            Self::All
        } else {
            Self::Tag(value.to_owned())
        }
    }
}

/// Active filter criteria. Every criterion defaults to "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Status restriction.
    pub status: StatusFilter,
    /// Priority restriction.
    pub priority: PriorityFilter,
    /// Tag restriction.
    pub tag: TagFilter,
    /// Search text, matched verbatim (case-insensitively); empty matches all.
    pub search: String,
}

impl FilterCriteria {
    /// Criteria that let every task through.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict by status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<StatusFilter>) -> Self {
        self.status = status.into();
        self
    }

    /// Restrict by priority.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<PriorityFilter>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Restrict by tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<TagFilter>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set the search text.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Returns true when any criterion narrows the view.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != StatusFilter::All
            || self.priority != PriorityFilter::All
            || self.tag != TagFilter::All
            || !self.search.is_empty()
    }

    /// Drop every restriction.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check a single task against every criterion (logical AND).
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_with(task, TextMatcher::new(&self.search).as_ref())
    }

    fn matches_with(&self, task: &Task, matcher: Option<&TextMatcher>) -> bool {
        self.status.matches(task)
            && self.priority.matches(task)
            && self.tag.matches(task)
            && matcher.is_none_or(|m| m.matches(task))
    }
}

/// Project `tasks` through `criteria`, sorted ascending by `order`.
///
/// The input is never modified; the result borrows from it.
#[must_use]
pub fn filter_tasks<'a>(tasks: &'a [Task], criteria: &FilterCriteria) -> Vec<&'a Task> {
    let matcher = TextMatcher::new(&criteria.search);
    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|task| criteria.matches_with(task, matcher.as_ref()))
        .collect();
    view.sort_by_key(|task| task.order);
    view
}

/// Distinct tags across the whole collection in first-seen order.
///
/// Tasks are visited by ascending `order`, then each task's tags in display order.
#[must_use]
pub fn all_tags(tasks: &[Task]) -> Vec<String> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by_key(|task| task.order);

    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for tag in ordered.iter().flat_map(|task| task.tags.iter()) {
        if seen.insert(tag.as_str()) {
            tags.push(tag.clone());
        }
    }
    tags
}

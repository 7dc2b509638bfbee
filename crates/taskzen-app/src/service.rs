use std::path::Path;

use anyhow::{Context, Result};
use taskzen_core::{
    FilterCriteria, Priority, PriorityFilter, StatusFilter, TagFilter, Task, TaskDraft, TaskId, TaskStats, all_tags,
    filter_tasks,
};
use taskzen_store_json::JsonFileStore;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::StoreResult;
use crate::notice::Notice;
use crate::persistence::TaskPersistence;
use crate::task_patch::TaskUpdate;
use crate::task_store::TaskStore;

/// Façade consumed by a presentation layer: the store plus the active filter
/// criteria and the derived views computed from them.
///
/// Derived views are recomputed on every call and never persisted.
pub struct TaskService<P> {
    store: TaskStore<P>,
    criteria: FilterCriteria,
    default_priority: Priority,
}

impl TaskService<JsonFileStore> {
    /// Load `.taskzen/config.toml` under `workdir` and open the JSON store it
    /// points at.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the data directory
    /// cannot be created.
    pub fn open_in(workdir: impl AsRef<Path>) -> Result<Self> {
        let workdir = workdir.as_ref();
        let config = EngineConfig::from_workdir(workdir)?;
        let data_dir = config.data_dir(workdir);
        let backend = JsonFileStore::open(&data_dir)
            .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;
        let store = TaskStore::open(backend, config.storage.namespace.clone());
        Ok(Self::new(store, &config))
    }
}

impl<P> TaskService<P> {
    /// Wrap an opened store.
    #[must_use]
    pub const fn new(store: TaskStore<P>, config: &EngineConfig) -> Self {
        Self {
            store,
            criteria: FilterCriteria {
                status: StatusFilter::All,
                priority: PriorityFilter::All,
                tag: TagFilter::All,
                search: String::new(),
            },
            default_priority: config.tasks.default_priority,
        }
    }

    /// Draft pre-filled with the configured default priority.
    #[must_use]
    pub fn draft(&self, title: impl Into<String>) -> TaskDraft {
        TaskDraft::new(title).priority(self.default_priority)
    }

    /// Active filter criteria.
    #[must_use]
    pub const fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Restrict the view by status.
    pub fn set_status_filter(&mut self, status: impl Into<StatusFilter>) {
        self.criteria.status = status.into();
        debug!(status = %self.criteria.status, "Status filter changed");
    }

    /// Restrict the view by priority.
    pub fn set_priority_filter(&mut self, priority: impl Into<PriorityFilter>) {
        self.criteria.priority = priority.into();
        debug!(priority = %self.criteria.priority, "Priority filter changed");
    }

    /// Restrict the view by tag.
    pub fn set_tag_filter(&mut self, tag: impl Into<TagFilter>) {
        self.criteria.tag = tag.into();
        debug!(tag = ?self.criteria.tag, "Tag filter changed");
    }

    /// Replace the search text.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.criteria.search = query.into();
    }

    /// Drop every restriction.
    pub fn clear_filters(&mut self) {
        self.criteria.reset();
    }

    /// Tasks passing the active criteria, ascending by `order`.
    #[must_use]
    pub fn filtered_tasks(&self) -> Vec<&Task> {
        filter_tasks(self.store.tasks(), &self.criteria)
    }

    /// Counts over the whole collection, ignoring the filter.
    #[must_use]
    pub fn stats(&self) -> TaskStats {
        TaskStats::compute_at(self.store.tasks(), self.store.now())
    }

    /// Every distinct tag in use.
    #[must_use]
    pub fn all_tags(&self) -> Vec<String> {
        all_tags(self.store.tasks())
    }

    /// The full collection, ascending by `order`.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    /// Look up a task.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.store.get(id)
    }

    /// Returns true when a deleted task can be restored.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    /// Drain queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.store.take_notices()
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &TaskStore<P> {
        &self.store
    }
}

impl<P: TaskPersistence> TaskService<P> {
    /// See [`TaskStore::create`].
    ///
    /// # Errors
    /// Propagates [`StoreError`](crate::StoreError) from the store.
    pub fn create(&mut self, draft: TaskDraft) -> StoreResult<Task> {
        self.store.create(draft)
    }

    /// See [`TaskStore::update`].
    ///
    /// # Errors
    /// Propagates [`StoreError`](crate::StoreError) from the store.
    pub fn update(&mut self, id: &TaskId, update: TaskUpdate) -> StoreResult<Task> {
        self.store.update(id, update)
    }

    /// See [`TaskStore::delete`].
    ///
    /// # Errors
    /// Propagates [`StoreError`](crate::StoreError) from the store.
    pub fn delete(&mut self, id: &TaskId) -> StoreResult<Task> {
        self.store.delete(id)
    }

    /// See [`TaskStore::toggle_status`].
    ///
    /// # Errors
    /// Propagates [`StoreError`](crate::StoreError) from the store.
    pub fn toggle_status(&mut self, id: &TaskId) -> StoreResult<Task> {
        self.store.toggle_status(id)
    }

    /// See [`TaskStore::reorder`]. Indices refer to the full collection, not
    /// the filtered view.
    ///
    /// # Errors
    /// Propagates [`StoreError`](crate::StoreError) from the store.
    pub fn reorder(&mut self, from: usize, to: usize) -> StoreResult<()> {
        self.store.reorder(from, to)
    }

    /// See [`TaskStore::restore`].
    pub fn restore(&mut self) -> Option<Task> {
        self.store.restore()
    }
}

//! Owner of the canonical task collection.

use std::collections::HashSet;

use taskzen_core::{Task, TaskDraft, TaskId};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, StoreResult};
use crate::notice::Notice;
use crate::persistence::TaskPersistence;
use crate::task_patch::TaskUpdate;
use crate::undo::UndoBuffer;

/// Namespace used when the configuration does not name one.
pub const DEFAULT_NAMESPACE: &str = "tasks";

/// Sole writer of the task collection.
///
/// The collection is kept sorted so that every task's `order` equals its index,
/// which makes `order` a dense `0..N` permutation after each call. Every
/// successful mutation is written through `persistence` before returning; a
/// failed write is logged and queued as [`Notice::PersistFailed`] but never
/// undoes the mutation.
pub struct TaskStore<P> {
    persistence: P,
    namespace: String,
    tasks: Vec<Task>,
    undo: UndoBuffer,
    clock: Box<dyn Clock>,
    notices: Vec<Notice>,
}

impl<P: TaskPersistence> TaskStore<P> {
    /// Load the collection saved under `namespace` using the wall clock.
    pub fn open(persistence: P, namespace: impl Into<String>) -> Self {
        Self::open_with_clock(persistence, namespace, SystemClock)
    }

    /// Load the collection saved under `namespace`.
    ///
    /// Unreadable data is treated as an empty collection and reported through
    /// [`Notice::LoadFailed`].
    pub fn open_with_clock(persistence: P, namespace: impl Into<String>, clock: impl Clock + 'static) -> Self {
        let namespace = namespace.into();
        let mut notices = Vec::new();
        let loaded = match persistence.load(&namespace) {
            Ok(tasks) => tasks.unwrap_or_default(),
            Err(err) => {
                warn!(%namespace, error = %err, "Stored collection unreadable; starting empty");
                notices.push(Notice::LoadFailed {
                    message: err.to_string(),
                });
                Vec::new()
            }
        };
        let tasks = settle(loaded, clock.now());
        info!(%namespace, count = tasks.len(), "Opened task store");

        Self {
            persistence,
            namespace,
            tasks,
            undo: UndoBuffer::new(),
            clock: Box::new(clock),
            notices,
        }
    }

    /// Create a task from `draft`, appending it at the end.
    ///
    /// # Errors
    /// Returns [`StoreError::Validation`] if the title is blank.
    pub fn create(&mut self, draft: TaskDraft) -> StoreResult<Task> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::Validation("title must not be empty".into()));
        }
        let task = draft.into_task(TaskId::new(), self.clock.now(), self.tasks.len());
        debug!(id = %task.id, order = task.order, "Created task");
        self.notices.push(Notice::TaskAdded { id: task.id.clone() });
        self.tasks.push(task.clone());
        self.persist();
        Ok(task)
    }

    /// Apply a partial update to the task with `id`.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] for an unknown id and
    /// [`StoreError::Validation`] if the update is inconsistent.
    pub fn update(&mut self, id: &TaskId, update: TaskUpdate) -> StoreResult<Task> {
        let idx = self.position(id)?;
        update.validate(&self.tasks[idx])?;
        let now = self.clock.now();
        let task = &mut self.tasks[idx];
        update.apply(task, now);
        let updated = task.clone();
        debug!(%id, "Updated task");
        self.persist();
        Ok(updated)
    }

    /// Remove the task with `id` and hold it in the undo buffer.
    ///
    /// Any task already in the buffer is discarded for good.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub fn delete(&mut self, id: &TaskId) -> StoreResult<Task> {
        let idx = self.position(id)?;
        let removed = self.tasks.remove(idx);
        self.renumber();
        if let Some(discarded) = self.undo.put(removed.clone()) {
            debug!(id = %discarded.id, "Discarded previously deleted task");
        }
        debug!(%id, remaining = self.tasks.len(), "Deleted task");
        self.notices.push(Notice::TaskDeleted {
            id: removed.id.clone(),
            title: removed.title.clone(),
        });
        self.persist();
        Ok(removed)
    }

    /// Flip the task between pending and completed.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] for an unknown id.
    pub fn toggle_status(&mut self, id: &TaskId) -> StoreResult<Task> {
        let idx = self.position(id)?;
        let now = self.clock.now();
        let task = &mut self.tasks[idx];
        task.set_status(task.status.toggled(), now);
        let toggled = task.clone();
        debug!(%id, status = %toggled.status, "Toggled task status");
        self.persist();
        Ok(toggled)
    }

    /// Move the task at position `from` to position `to` (list-move semantics)
    /// and renumber every task.
    ///
    /// # Errors
    /// Returns [`StoreError::OutOfRange`] if either index is not a valid position.
    pub fn reorder(&mut self, from: usize, to: usize) -> StoreResult<()> {
        let len = self.tasks.len();
        for index in [from, to] {
            if index >= len {
                return Err(StoreError::OutOfRange { index, len });
            }
        }
        let moved = self.tasks.remove(from);
        self.tasks.insert(to, moved);
        self.renumber();
        debug!(from, to, "Reordered tasks");
        self.persist();
        Ok(())
    }

    /// Put the most recently deleted task back at the end of the collection.
    ///
    /// Returns `None`, and queues [`Notice::NothingToUndo`], when the buffer is
    /// empty.
    pub fn restore(&mut self) -> Option<Task> {
        let Some(mut task) = self.undo.take() else {
            self.notices.push(Notice::NothingToUndo);
            return None;
        };
        task.order = self.tasks.len();
        debug!(id = %task.id, order = task.order, "Restored task");
        self.notices.push(Notice::TaskRestored { id: task.id.clone() });
        self.tasks.push(task.clone());
        self.persist();
        Some(task)
    }

    fn persist(&mut self) {
        if let Err(err) = self.persistence.save(&self.namespace, &self.tasks) {
            warn!(namespace = %self.namespace, error = %err, "Failed to persist tasks; keeping in-memory state");
            self.notices.push(Notice::PersistFailed {
                message: err.to_string(),
            });
        }
    }
}

impl<P> TaskStore<P> {
    /// Every task, ascending by `order`.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Number of tasks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true when the collection is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Persistence key of this collection.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns true when [`restore`](Self::restore) would bring a task back.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// The task [`restore`](Self::restore) would bring back.
    #[must_use]
    pub const fn pending_undo(&self) -> Option<&Task> {
        self.undo.peek()
    }

    /// Current instant according to the store's clock.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Borrow the persistence backend.
    #[must_use]
    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    fn position(&self, id: &TaskId) -> StoreResult<usize> {
        self.tasks
            .iter()
            .position(|task| &task.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn renumber(&mut self) {
        for (idx, task) in self.tasks.iter_mut().enumerate() {
            task.order = idx;
        }
    }
}

/// Bring loaded data into canonical shape: sorted by `order`, one task per id
/// (first wins), ranks renumbered densely, and `completed_at` present exactly
/// on completed tasks (missing stamps get `now`).
fn settle(mut tasks: Vec<Task>, now: OffsetDateTime) -> Vec<Task> {
    tasks.sort_by_key(|task| task.order);
    let mut seen = HashSet::new();
    tasks.retain(|task| {
        let fresh = seen.insert(task.id.clone());
        if !fresh {
            warn!(id = %task.id, "Dropping duplicate task id from stored collection");
        }
        fresh
    });
    for (idx, task) in tasks.iter_mut().enumerate() {
        task.order = idx;
        match (task.is_completed(), task.completed_at) {
            (true, None) => {
                warn!(id = %task.id, "Completed task without completion time; stamping now");
                task.completed_at = Some(now);
            }
            (false, Some(_)) => {
                warn!(id = %task.id, "Pending task with completion time; clearing it");
                task.completed_at = None;
            }
            _ => {}
        }
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::persistence::MemoryPersistence;
    use taskzen_core::{Priority, TaskStatus};
    use time::Duration;
    use time::macros::datetime;

    const NS: &str = "tasks";

    fn ok<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> T {
        result.unwrap_or_else(|err| panic!("{context}: {err}"))
    }

    fn fixture() -> (TaskStore<MemoryPersistence>, MemoryPersistence, FixedClock) {
        let backend = MemoryPersistence::new();
        let clock = FixedClock::new(datetime!(2025-04-01 09:00 UTC));
        let store = TaskStore::open_with_clock(backend.clone(), NS, clock.clone());
        (store, backend, clock)
    }

    fn seeded(titles: &[&str]) -> (TaskStore<MemoryPersistence>, MemoryPersistence, FixedClock) {
        let (mut store, backend, clock) = fixture();
        for title in titles {
            ok(store.create(TaskDraft::new(*title)), "create");
        }
        store.take_notices();
        (store, backend, clock)
    }

    fn titles<P>(store: &TaskStore<P>) -> Vec<&str> {
        store.tasks().iter().map(|task| task.title.as_str()).collect()
    }

    fn assert_dense<P>(store: &TaskStore<P>) {
        let mut orders: Vec<usize> = store.tasks().iter().map(|task| task.order).collect();
        orders.sort_unstable();
        assert_eq!(orders, (0..store.len()).collect::<Vec<_>>());
    }

    fn id_of<P>(store: &TaskStore<P>, title: &str) -> TaskId {
        store
            .tasks()
            .iter()
            .find(|task| task.title == title)
            .map(|task| task.id.clone())
            .unwrap_or_else(|| panic!("task {title} must exist"))
    }

    #[test]
    fn create_appends_with_next_order_and_persists() {
        let (mut store, backend, clock) = seeded(&["A", "B"]);
        let task = ok(
            store.create(TaskDraft::new("C").priority(Priority::Urgent).tags(["work"])),
            "create",
        );

        assert_eq!(task.order, 2);
        assert_eq!(task.created_at, clock.now());
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());
        assert_eq!(store.get(&task.id), Some(&task));
        assert_eq!(backend.stored(NS), Some(store.tasks().to_vec()));
        assert_eq!(store.take_notices(), vec![Notice::TaskAdded { id: task.id }]);
    }

    #[test]
    fn create_with_blank_title_changes_nothing() {
        let (mut store, backend, _clock) = seeded(&["A"]);
        let before = store.tasks().to_vec();
        let saves = backend.save_count();

        for title in ["", "   "] {
            let Err(err) = store.create(TaskDraft::new(title)) else {
                panic!("blank title must be rejected");
            };
            assert!(matches!(err, StoreError::Validation(_)));
        }
        assert_eq!(store.tasks(), before.as_slice());
        assert_eq!(backend.save_count(), saves);
        assert!(store.take_notices().is_empty());
    }

    #[test]
    fn update_overwrites_fields_but_not_order_or_created_at() {
        let (mut store, backend, clock) = seeded(&["A", "B"]);
        let id = id_of(&store, "B");
        let before = store.get(&id).cloned().unwrap_or_else(|| panic!("B exists"));
        clock.advance(Duration::hours(1));

        let updated = ok(
            store.update(&id, TaskUpdate::new().title("B2").tags(["home"]).priority(Priority::Low)),
            "update",
        );
        assert_eq!(updated.title, "B2");
        assert_eq!(updated.tags, vec!["home"]);
        assert_eq!(updated.priority, Priority::Low);
        assert_eq!(updated.order, before.order);
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.completed_at.is_none());
        assert_eq!(backend.stored(NS), Some(store.tasks().to_vec()));
    }

    #[test]
    fn update_rejections_leave_task_unchanged() {
        let (mut store, _backend, _clock) = seeded(&["A"]);
        let id = id_of(&store, "A");
        let before = store.tasks().to_vec();

        let missing = TaskId::from("missing");
        assert_eq!(
            store.update(&missing, TaskUpdate::new().title("x")),
            Err(StoreError::NotFound(missing))
        );
        assert!(matches!(
            store.update(&id, TaskUpdate::new().title(" ").priority(Priority::High)),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn delete_renumbers_and_buffers_task() {
        let (mut store, backend, _clock) = seeded(&["A", "B", "C", "D"]);
        let id = id_of(&store, "B");

        let removed = ok(store.delete(&id), "delete");
        assert_eq!(removed.title, "B");
        assert_eq!(titles(&store), vec!["A", "C", "D"]);
        assert_dense(&store);
        assert!(store.can_undo());
        assert_eq!(store.pending_undo().map(|task| &task.id), Some(&id));
        assert_eq!(backend.stored(NS).map(|tasks| tasks.len()), Some(3));

        let notices = store.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].offers_undo());
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let (mut store, _backend, _clock) = seeded(&["A"]);
        let missing = TaskId::from("nope");
        assert_eq!(store.delete(&missing), Err(StoreError::NotFound(missing)));
        assert!(!store.can_undo());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn toggle_twice_restores_status_and_clears_completion() {
        let (mut store, backend, clock) = seeded(&["A"]);
        let id = id_of(&store, "A");

        clock.advance(Duration::minutes(30));
        let done = ok(store.toggle_status(&id), "complete");
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.completed_at, Some(clock.now()));
        assert_eq!(backend.stored(NS), Some(store.tasks().to_vec()));

        clock.advance(Duration::minutes(30));
        let reopened = ok(store.toggle_status(&id), "reopen");
        assert_eq!(reopened.status, TaskStatus::Pending);
        assert!(reopened.completed_at.is_none());
        assert_eq!(backend.stored(NS), Some(store.tasks().to_vec()));

        assert!(matches!(
            store.toggle_status(&TaskId::from("ghost")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn reorder_moves_like_a_list() {
        let (mut store, backend, _clock) = seeded(&["A", "B", "C", "D"]);
        ok(store.reorder(0, 2), "reorder");

        assert_eq!(titles(&store), vec!["B", "C", "A", "D"]);
        let orders: Vec<usize> = store.tasks().iter().map(|task| task.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
        assert_eq!(backend.stored(NS), Some(store.tasks().to_vec()));

        ok(store.reorder(3, 0), "reorder back");
        assert_eq!(titles(&store), vec!["D", "B", "C", "A"]);
        ok(store.reorder(1, 1), "no-op move");
        assert_eq!(titles(&store), vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn reorder_out_of_range_changes_nothing() {
        let (mut store, backend, _clock) = seeded(&["A", "B"]);
        let saves = backend.save_count();

        assert_eq!(store.reorder(2, 0), Err(StoreError::OutOfRange { index: 2, len: 2 }));
        assert_eq!(store.reorder(0, 5), Err(StoreError::OutOfRange { index: 5, len: 2 }));
        assert_eq!(titles(&store), vec!["A", "B"]);
        assert_eq!(backend.save_count(), saves);

        let (mut empty, _backend, _clock) = fixture();
        assert_eq!(empty.reorder(0, 0), Err(StoreError::OutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn restore_appends_deleted_task_at_end() {
        let (mut store, _backend, _clock) = seeded(&["A", "B", "C"]);
        let id = id_of(&store, "A");
        let original = store.get(&id).cloned().unwrap_or_else(|| panic!("A exists"));

        ok(store.delete(&id), "delete");
        let restored = store.restore().unwrap_or_else(|| panic!("restore must succeed"));

        assert_eq!(restored.id, original.id);
        assert_eq!(restored.title, original.title);
        assert_eq!(restored.priority, original.priority);
        assert_eq!(restored.tags, original.tags);
        assert_eq!(restored.due_date, original.due_date);
        assert_eq!(restored.created_at, original.created_at);
        assert_eq!(restored.order, 2);
        assert_eq!(titles(&store), vec!["B", "C", "A"]);
        assert_dense(&store);
        assert!(!store.can_undo());
    }

    #[test]
    fn second_delete_discards_first() {
        let (mut store, _backend, _clock) = seeded(&["A", "B", "C"]);
        let first = id_of(&store, "A");
        let second = id_of(&store, "B");
        ok(store.delete(&first), "delete first");
        ok(store.delete(&second), "delete second");

        let restored = store.restore().map(|task| task.id);
        assert_eq!(restored, Some(second));
        assert!(store.get(&first).is_none());
        assert!(store.restore().is_none());
        assert_eq!(titles(&store), vec!["C", "B"]);
    }

    #[test]
    fn restore_with_empty_buffer_is_a_noop() {
        let (mut store, backend, _clock) = seeded(&["A"]);
        let saves = backend.save_count();

        assert!(store.restore().is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(backend.save_count(), saves);
        assert_eq!(store.take_notices(), vec![Notice::NothingToUndo]);
    }

    #[test]
    fn orders_stay_dense_through_mixed_operations() {
        let (mut store, _backend, _clock) = seeded(&["A", "B", "C", "D", "E"]);
        let steps: [(&str, usize, usize); 4] = [("B", 0, 3), ("D", 2, 0), ("A", 1, 2), ("E", 0, 1)];
        for (victim, from, to) in steps {
            let id = id_of(&store, victim);
            ok(store.reorder(from, to), "reorder");
            assert_dense(&store);
            ok(store.delete(&id), "delete");
            assert_dense(&store);
            ok(store.create(TaskDraft::new(format!("{victim}'"))), "create");
            assert_dense(&store);
            if store.restore().is_some() {
                assert_dense(&store);
            }
        }
    }

    #[test]
    fn failed_save_keeps_mutation_and_reports_it() {
        let (mut store, backend, _clock) = seeded(&["A"]);
        let persisted = backend.stored(NS);
        backend.fail_saves(true);

        let created = ok(store.create(TaskDraft::new("B")), "create despite failing storage");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&created.id).map(|task| task.title.as_str()), Some("B"));
        assert_eq!(backend.stored(NS), persisted);

        let notices = store.take_notices();
        assert!(matches!(notices.as_slice(), [Notice::TaskAdded { .. }, Notice::PersistFailed { .. }]));
    }

    #[test]
    fn open_reloads_saved_collection() {
        let (mut store, backend, clock) = seeded(&["A", "B", "C"]);
        ok(store.reorder(2, 0), "reorder");
        let expected = store.tasks().to_vec();

        let reopened = TaskStore::open_with_clock(backend, NS, clock);
        assert_eq!(reopened.tasks(), expected.as_slice());
        assert!(!reopened.can_undo());
    }

    #[test]
    fn open_normalizes_gaps_and_duplicates() {
        let created = datetime!(2025-01-01 00:00 UTC);
        let stored = vec![
            TaskDraft::new("late").into_task(TaskId::from("3"), created, 9),
            TaskDraft::new("early").into_task(TaskId::from("1"), created, 2),
            TaskDraft::new("dup").into_task(TaskId::from("1"), created, 5),
            TaskDraft::new("middle").into_task(TaskId::from("2"), created, 4),
        ];
        let backend = MemoryPersistence::with_tasks(NS, stored);
        let store = TaskStore::open(&backend, NS);

        assert_eq!(titles(&store), vec!["early", "middle", "late"]);
        assert_dense(&store);
    }

    #[test]
    fn open_repairs_completion_times() {
        let created = datetime!(2025-01-01 00:00 UTC);
        let loaded_at = datetime!(2025-04-01 09:00 UTC);
        let mut stamped_pending = TaskDraft::new("pending").into_task(TaskId::from("p"), created, 0);
        stamped_pending.completed_at = Some(created);
        let mut unstamped_done = TaskDraft::new("done").into_task(TaskId::from("d"), created, 1);
        unstamped_done.status = TaskStatus::Completed;
        let backend = MemoryPersistence::with_tasks(NS, vec![stamped_pending, unstamped_done]);

        let store = TaskStore::open_with_clock(&backend, NS, FixedClock::new(loaded_at));
        let pending = store.get(&TaskId::from("p")).unwrap_or_else(|| panic!("p exists"));
        assert!(pending.completed_at.is_none());
        let done = store.get(&TaskId::from("d")).unwrap_or_else(|| panic!("d exists"));
        assert_eq!(done.completed_at, Some(loaded_at));
    }

    #[test]
    fn unreadable_storage_opens_empty() {
        let backend = MemoryPersistence::new();
        backend.fail_loads(true);
        let mut store = TaskStore::open(backend, NS);

        assert!(store.is_empty());
        let notices = store.take_notices();
        assert!(matches!(notices.as_slice(), [Notice::LoadFailed { .. }]));
        assert!(notices[0].is_error());
    }
}

use super::models::{Task, TaskFilter};
use crate::storage::{self, SlotStore, StorageError, TASKS_KEY};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct TaskStore<S: SlotStore> {
    tasks: Vec<Task>,
    slots: S,
    save_error: Option<StorageError>,
}

impl<S: SlotStore> TaskStore<S> {
    pub fn load(slots: S) -> Self {
        let tasks = match storage::load_json::<Vec<Task>, S>(&slots, TASKS_KEY) {
            Ok(Some(tasks)) => tasks,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "discarding unreadable task list");
                Vec::new()
            }
        };
        debug!(count = tasks.len(), "task store loaded");
        Self {
            tasks,
            slots,
            save_error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    pub fn add_task(&mut self, text: &str) -> bool {
        self.add_task_at(text, Utc::now())
    }

    pub fn add_task_at(&mut self, text: &str, now: DateTime<Utc>) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let id = self.next_id(now);
        let mut tasks = self.tasks.clone();
        tasks.push(Task::new(id, text.to_string(), now));
        debug!(id, "task added");
        self.replace(tasks);
        true
    }

    pub fn toggle_task(&mut self, id: i64) -> bool {
        if !self.contains(id) {
            return false;
        }

        let tasks = self
            .tasks
            .iter()
            .map(|task| if task.id == id { task.toggled() } else { task.clone() })
            .collect();
        debug!(id, "task toggled");
        self.replace(tasks);
        true
    }

    pub fn delete_task(&mut self, id: i64) -> bool {
        if !self.contains(id) {
            return false;
        }

        let tasks = self.tasks.iter().filter(|task| task.id != id).cloned().collect();
        debug!(id, "task deleted");
        self.replace(tasks);
        true
    }

    pub fn filtered_tasks(&self, filter: TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|task| filter.matches(task)).collect()
    }

    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|task| !task.completed).count()
    }

    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    pub fn save(&mut self) -> Result<(), StorageError> {
        storage::save_json(&mut self.slots, TASKS_KEY, &self.tasks)
    }

    // Failure from the most recent mutation's write, if any.
    pub fn take_save_error(&mut self) -> Option<StorageError> {
        self.save_error.take()
    }

    fn contains(&self, id: i64) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    fn next_id(&self, now: DateTime<Utc>) -> i64 {
        let candidate = now.timestamp_millis();
        match self.tasks.iter().map(|task| task.id).max() {
            Some(max) if candidate <= max => match max.checked_add(1) {
                Some(id) => id,
                None => self.smallest_free_id(),
            },
            _ => candidate,
        }
    }

    fn smallest_free_id(&self) -> i64 {
        let taken: HashSet<i64> = self.tasks.iter().map(|task| task.id).collect();
        // A list can't hold every positive i64, so this always finds one.
        (1..=i64::MAX).find(|id| !taken.contains(id)).unwrap_or(0)
    }

    fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        // In-memory list stays authoritative when the slot can't be written.
        self.save_error = self.save().err();
        if let Some(e) = &self.save_error {
            warn!(error = %e, "failed to persist task list");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemorySlotStore;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn store_with(texts: &[&str]) -> TaskStore<MemorySlotStore> {
        let mut store = TaskStore::load(MemorySlotStore::new());
        for (i, text) in texts.iter().enumerate() {
            assert!(store.add_task_at(text, at(i as i64)));
        }
        store
    }

    #[test]
    fn test_load_missing_slot_starts_empty() {
        let store = TaskStore::load(MemorySlotStore::new());
        assert_eq!(store.total(), 0);
    }

    #[test]
    fn test_load_corrupt_slot_starts_empty() {
        let store = TaskStore::load(MemorySlotStore::with_slot("tasks", "{\"oops\": 1"));
        assert!(store.tasks().is_empty());

        let store = TaskStore::load(MemorySlotStore::with_slot("tasks", "[{\"id\": \"nope\"}]"));
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_add_task_appends_incomplete_task() {
        let mut store = store_with(&["one"]);
        assert!(store.add_task_at("two", at(10)));

        assert_eq!(store.total(), 2);
        let added = &store.tasks()[1];
        assert_eq!(added.text, "two");
        assert!(!added.completed);
        assert_eq!(added.created_at, at(10));
        assert_eq!(added.id, at(10).timestamp_millis());
    }

    #[test]
    fn test_add_task_keeps_text_as_entered() {
        let mut store = store_with(&[]);
        store.add_task_at("  padded  ", at(0));
        assert_eq!(store.tasks()[0].text, "  padded  ");
    }

    #[test]
    fn test_add_blank_task_is_noop() {
        let mut store = store_with(&["keep"]);
        let before = store.tasks().to_vec();
        let writes = store.slots().writes;

        assert!(!store.add_task_at("", at(5)));
        assert!(!store.add_task_at("   ", at(6)));
        assert!(!store.add_task_at("\t\n", at(7)));

        assert_eq!(store.tasks(), before.as_slice());
        assert_eq!(store.slots().writes, writes);
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut store = store_with(&[]);
        store.add_task_at("a", at(0));
        store.add_task_at("b", at(0));
        store.add_task_at("c", at(-100));

        let ids: Vec<i64> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids[1], ids[0] + 1);
        assert_eq!(ids[2], ids[1] + 1);
    }

    #[test]
    fn test_toggle_flips_only_target() {
        let mut store = store_with(&["a", "b", "c"]);
        let before = store.tasks().to_vec();
        let target = before[1].id;

        assert!(store.toggle_task(target));

        let after = store.tasks();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
        assert!(after[1].completed);
        assert_eq!(after[1].text, before[1].text);
        assert_eq!(after[1].created_at, before[1].created_at);

        assert!(store.toggle_task(target));
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let mut store = store_with(&["a", "b"]);
        let before = store.tasks().to_vec();
        let writes = store.slots().writes;

        assert!(!store.toggle_task(42));
        assert_eq!(store.tasks(), before.as_slice());
        assert_eq!(store.slots().writes, writes);
    }

    #[test]
    fn test_delete_preserves_order_of_rest() {
        let mut store = store_with(&["a", "b", "c", "d"]);
        let target = store.tasks()[1].id;

        assert!(store.delete_task(target));

        let texts: Vec<&str> = store.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c", "d"]);
        assert!(!store.delete_task(target));
        assert_eq!(store.total(), 3);
    }

    #[test]
    fn test_filtered_views_partition_list() {
        let mut store = store_with(&["a", "b", "c", "d", "e"]);
        let ids: Vec<i64> = store.tasks().iter().map(|t| t.id).collect();
        store.toggle_task(ids[0]);
        store.toggle_task(ids[3]);

        let active: Vec<i64> = store.filtered_tasks(TaskFilter::Active).iter().map(|t| t.id).collect();
        let completed: Vec<i64> = store.filtered_tasks(TaskFilter::Completed).iter().map(|t| t.id).collect();
        let all: Vec<i64> = store.filtered_tasks(TaskFilter::All).iter().map(|t| t.id).collect();

        assert_eq!(active, vec![ids[1], ids[2], ids[4]]);
        assert_eq!(completed, vec![ids[0], ids[3]]);
        assert_eq!(all, ids);
        assert!(active.iter().all(|id| !completed.contains(id)));
        assert_eq!(active.len() + completed.len(), store.total());
    }

    #[test]
    fn test_stats_follow_mutations() {
        let mut store = store_with(&["a", "b", "c"]);
        assert_eq!((store.remaining(), store.total()), (3, 3));

        let first = store.tasks()[0].id;
        store.toggle_task(first);
        assert_eq!((store.remaining(), store.total()), (2, 3));

        store.delete_task(first);
        assert_eq!((store.remaining(), store.total()), (2, 2));
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let mut store = store_with(&["a"]);
        let id = store.tasks()[0].id;
        store.toggle_task(id);

        let raw = store.slots().slots.get("tasks").unwrap().clone();
        let persisted: Vec<Task> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, store.tasks());

        store.delete_task(id);
        let raw = store.slots().slots.get("tasks").unwrap();
        assert_eq!(raw, "[]");
    }

    #[test]
    fn test_round_trip_through_slot() {
        let mut store = store_with(&["first", "second", "third"]);
        let second = store.tasks()[1].id;
        store.toggle_task(second);
        let expected = store.tasks().to_vec();

        let raw = store.slots().slots.get("tasks").unwrap().clone();
        let reloaded = TaskStore::load(MemorySlotStore::with_slot("tasks", &raw));

        assert_eq!(reloaded.tasks(), expected.as_slice());
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut store = TaskStore::load(MemorySlotStore::failing());

        assert!(store.add_task_at("still here", at(0)));
        assert_eq!(store.total(), 1);
        assert!(store.save().is_err());

        let id = store.tasks()[0].id;
        assert!(store.toggle_task(id));
        assert!(store.tasks()[0].completed);
    }

    #[test]
    fn test_failed_write_is_reported_once() {
        let mut store = TaskStore::load(MemorySlotStore::failing());
        store.add_task_at("a", at(0));

        assert!(matches!(store.take_save_error(), Some(StorageError::Write { .. })));
        assert!(store.take_save_error().is_none());
    }

    #[test]
    fn test_successful_write_clears_save_error() {
        let mut store = store_with(&["a"]);
        assert!(store.take_save_error().is_none());
        assert_eq!(store.slots().writes, 1);
    }

    #[test]
    fn test_add_after_max_id_does_not_overflow() {
        let raw = format!(
            r#"[{{"id":{},"text":"last","completed":false,"createdAt":"2024-03-01T12:00:00.000Z"}},{{"id":1,"text":"first","completed":false,"createdAt":"2024-03-01T12:00:00.000Z"}}]"#,
            i64::MAX
        );
        let mut store = TaskStore::load(MemorySlotStore::with_slot("tasks", &raw));
        assert_eq!(store.total(), 2);

        assert!(store.add_task_at("next", at(0)));
        assert!(store.add_task_at("after", at(0)));

        let ids: Vec<i64> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![i64::MAX, 1, 2, 3]);
    }
}

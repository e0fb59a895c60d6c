//! TaskStore - pending tasks, completed ids and the watch-list.
//!
//! Pure in-memory bookkeeping; the scheduler wraps it in a mutex and does all
//! I/O outside of it.
//!
//! Invariants:
//! - an id in the completed log is never admitted to `pending`;
//! - `pending` holds at most one task per id;
//! - the completed log never exceeds its cap and evicts oldest first;
//! - the watch-list is checked on admission only.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use chrono::{DateTime, Duration, Utc};

use crate::domain::{
    ALL_AUDITORIUMS, AuditoriumId, SchedulerState, Task, TaskId, sort_tasks,
};

/// Result of trying to put a task into `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    AlreadyPending,
    AlreadyCompleted,
    NotWatched,
    /// The task can never become due (Q&A kind for a talk without Q&A).
    NoDueTime,
}

/// Ordered, capped history of completed task ids.
#[derive(Debug)]
struct CompletedLog {
    order: VecDeque<TaskId>,
    index: HashSet<TaskId>,
    cap: usize,
}

impl CompletedLog {
    fn new(cap: usize) -> Self {
        Self {
            order: VecDeque::new(),
            index: HashSet::new(),
            cap: cap.max(1),
        }
    }

    fn contains(&self, id: &TaskId) -> bool {
        self.index.contains(id)
    }

    fn push(&mut self, id: TaskId) {
        if !self.index.insert(id.clone()) {
            return;
        }
        self.order.push_back(id);
        while self.order.len() > self.cap {
            if let Some(evicted) = self.order.pop_front() {
                self.index.remove(&evicted);
            }
        }
    }

    fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn to_vec(&self) -> Vec<TaskId> {
        self.order.iter().cloned().collect()
    }
}

/// Tasks picked by one Executing phase.
#[derive(Debug, Default)]
pub struct DueTasks {
    /// To dispatch, in narrative order. Still pending until completed.
    pub due: Vec<Task>,
    /// Stale skippable reminders; already moved to the completed log.
    pub skipped: Vec<Task>,
    /// Pending entries dropped because their id was already completed.
    pub discarded: usize,
}

#[derive(Debug)]
pub struct TaskStore {
    pending: HashMap<TaskId, Task>,
    completed: CompletedLog,
    watched: BTreeSet<AuditoriumId>,
}

impl TaskStore {
    pub fn new(completed_cap: usize) -> Self {
        Self {
            pending: HashMap::new(),
            completed: CompletedLog::new(completed_cap),
            watched: BTreeSet::new(),
        }
    }

    /// Replace completed ids and watch-list with persisted state.
    /// Pending tasks are left alone.
    pub fn restore(&mut self, state: SchedulerState) {
        self.completed.clear();
        for id in state.completed_ids {
            self.completed.push(id);
        }
        self.watched = state.watched_auditoriums;
    }

    pub fn snapshot(&self) -> SchedulerState {
        SchedulerState {
            completed_ids: self.completed.to_vec(),
            watched_auditoriums: self.watched.clone(),
        }
    }

    pub fn admit(&mut self, task: Task, qa_buffer: Duration) -> Admission {
        if self.pending.contains_key(&task.id) {
            return Admission::AlreadyPending;
        }
        if self.completed.contains(&task.id) {
            return Admission::AlreadyCompleted;
        }
        if !self.is_watching(&task.talk.auditorium_id) {
            return Admission::NotWatched;
        }
        if task.start_time(qa_buffer).is_none() {
            return Admission::NoDueTime;
        }
        self.pending.insert(task.id.clone(), task);
        Admission::Admitted
    }

    pub fn is_watching(&self, auditorium: &AuditoriumId) -> bool {
        self.watched.contains(auditorium) || self.watched.iter().any(|w| w.as_str() == ALL_AUDITORIUMS)
    }

    /// Returns `false` when the auditorium was already watched.
    pub fn watch(&mut self, auditorium: AuditoriumId) -> bool {
        self.watched.insert(auditorium)
    }

    pub fn is_pending(&self, id: &TaskId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn is_completed(&self, id: &TaskId) -> bool {
        self.completed.contains(id)
    }

    /// Select the tasks whose time has come.
    ///
    /// Skippable reminders more than `stale_after` overdue are completed
    /// without being returned for dispatch.
    pub fn take_due(
        &mut self,
        now: DateTime<Utc>,
        qa_buffer: Duration,
        stale_after: Duration,
    ) -> DueTasks {
        let mut batch = DueTasks::default();

        let already_done: Vec<TaskId> = self
            .pending
            .keys()
            .filter(|id| self.completed.contains(id))
            .cloned()
            .collect();
        batch.discarded = already_done.len();
        for id in already_done {
            self.pending.remove(&id);
        }

        let mut stale = Vec::new();
        for task in self.pending.values() {
            let Some(due_at) = task.start_time(qa_buffer) else {
                continue;
            };
            if due_at > now {
                continue;
            }
            if task.kind.is_skippable() && now - due_at > stale_after {
                stale.push(task.id.clone());
            } else {
                batch.due.push(task.clone());
            }
        }

        for id in stale {
            if let Some(task) = self.pending.remove(&id) {
                self.completed.push(id);
                batch.skipped.push(task);
            }
        }

        sort_tasks(&mut batch.due, qa_buffer);
        sort_tasks(&mut batch.skipped, qa_buffer);
        batch
    }

    /// Move a task out of `pending` into the completed log, whether or not
    /// it is still pending.
    pub fn complete(&mut self, id: &TaskId) {
        self.pending.remove(id);
        self.completed.push(id.clone());
    }

    pub fn reset_completed(&mut self) {
        self.completed.clear();
    }

    /// Forget every pending task and stop watching all auditoriums.
    pub fn stop(&mut self) {
        self.pending.clear();
        self.watched.clear();
    }

    pub fn pending_tasks(&self, qa_buffer: Duration) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.pending.values().cloned().collect();
        sort_tasks(&mut tasks, qa_buffer);
        tasks
    }

    pub fn completed_ids(&self) -> Vec<TaskId> {
        self.completed.to_vec()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }

    pub fn watched(&self) -> impl Iterator<Item = &AuditoriumId> {
        self.watched.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Talk, TaskKind};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap()
    }

    fn talk(id: &str, aud: &str) -> Talk {
        Talk::new(id, aud, t0(), t0() + Duration::minutes(30))
    }

    fn watching(aud: &str) -> TaskStore {
        let mut store = TaskStore::new(200);
        store.watch(AuditoriumId::new(aud));
        store
    }

    #[test]
    fn admitting_twice_keeps_one_task() {
        let mut store = watching("main");
        let task = Task::new(TaskKind::TalkStart, talk("t1", "main"));

        assert_eq!(store.admit(task.clone(), Duration::zero()), Admission::Admitted);
        assert_eq!(store.admit(task, Duration::zero()), Admission::AlreadyPending);
        assert_eq!(store.pending_len(), 1);
    }

    #[test]
    fn completed_ids_are_never_readmitted() {
        let mut store = watching("main");
        let task = Task::new(TaskKind::TalkStart, talk("t1", "main"));
        store.complete(&task.id);

        assert_eq!(store.admit(task, Duration::zero()), Admission::AlreadyCompleted);
        assert_eq!(store.pending_len(), 0);
    }

    #[test]
    fn unwatched_auditorium_is_not_admitted() {
        let mut store = watching("main");
        let task = Task::new(TaskKind::TalkStart, talk("t1", "side"));
        assert_eq!(store.admit(task, Duration::zero()), Admission::NotWatched);
    }

    #[test]
    fn all_watches_every_auditorium() {
        let mut store = watching(ALL_AUDITORIUMS);
        for aud in ["main", "side", "workshop"] {
            let task = Task::new(TaskKind::TalkEnd, talk("t1", aud));
            assert_eq!(store.admit(task, Duration::zero()), Admission::Admitted);
        }
    }

    #[test]
    fn qa_task_without_qa_has_no_due_time() {
        let mut store = watching("main");
        let task = Task::new(TaskKind::TalkQa, talk("t1", "main"));
        assert_eq!(store.admit(task, Duration::zero()), Admission::NoDueTime);
    }

    #[test]
    fn watch_list_changes_are_not_retroactive() {
        let mut store = watching("main");
        let task = Task::new(TaskKind::TalkStart, talk("t1", "main"));
        store.admit(task.clone(), Duration::zero());

        store.watched.clear();
        assert!(store.is_pending(&task.id));
    }

    #[test]
    fn completed_log_is_capped_oldest_first() {
        let mut store = TaskStore::new(3);
        let ids: Vec<TaskId> = (0..5)
            .map(|i| Task::new(TaskKind::TalkEnd, talk(&format!("t{i}"), "main")).id)
            .collect();
        for id in &ids {
            store.complete(id);
        }

        assert_eq!(store.completed_ids(), ids[2..].to_vec());
        assert!(!store.is_completed(&ids[0]));
        assert!(!store.is_completed(&ids[1]));
        assert!(store.is_completed(&ids[4]));
    }

    #[test]
    fn restore_applies_the_cap() {
        let mut store = TaskStore::new(2);
        let ids: Vec<TaskId> = (0..4)
            .map(|i| Task::new(TaskKind::TalkEnd, talk(&format!("t{i}"), "main")).id)
            .collect();
        store.restore(SchedulerState {
            completed_ids: ids.clone(),
            watched_auditoriums: BTreeSet::new(),
        });
        assert_eq!(store.completed_ids(), ids[2..].to_vec());
    }

    #[test]
    fn take_due_skips_stale_reminders_but_not_primaries() {
        let mut store = watching("main");
        let checkin = Task::new(TaskKind::TalkCheckin30M, talk("t1", "main"));
        let end = Task::new(
            TaskKind::TalkEnd,
            Talk::new("t0", "main", t0() - Duration::hours(1), t0() - Duration::minutes(30)),
        );
        store.admit(checkin.clone(), Duration::zero());
        store.admit(end.clone(), Duration::zero());

        // Checkin-30m is due at t0-30m; end is due at t0-30m. Both 11 minutes late.
        let now = t0() - Duration::minutes(19);
        let batch = store.take_due(now, Duration::zero(), Duration::minutes(10));

        assert_eq!(batch.due.len(), 1);
        assert_eq!(batch.due[0].id, end.id);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].id, checkin.id);
        assert!(store.is_completed(&checkin.id));
        assert!(store.is_pending(&end.id));
    }

    #[test]
    fn take_due_keeps_skippable_within_staleness() {
        let mut store = watching("main");
        let reminder = Task::new(TaskKind::TalkStart1H, talk("t1", "main"));
        store.admit(reminder.clone(), Duration::zero());

        let now = t0() - Duration::minutes(50);
        let batch = store.take_due(now, Duration::zero(), Duration::minutes(10));
        assert_eq!(batch.due.len(), 1);
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn take_due_leaves_future_tasks_pending() {
        let mut store = watching("main");
        let start = Task::new(TaskKind::TalkStart, talk("t1", "main"));
        store.admit(start.clone(), Duration::zero());

        let batch = store.take_due(t0() - Duration::seconds(1), Duration::zero(), Duration::minutes(10));
        assert!(batch.due.is_empty());
        assert!(store.is_pending(&start.id));
    }

    #[test]
    fn take_due_discards_pending_that_were_completed() {
        let mut store = watching("main");
        let start = Task::new(TaskKind::TalkStart, talk("t1", "main"));
        store.admit(start.clone(), Duration::zero());
        store.completed.push(start.id.clone());

        let batch = store.take_due(t0(), Duration::zero(), Duration::minutes(10));
        assert_eq!(batch.discarded, 1);
        assert!(batch.due.is_empty());
        assert!(!store.is_pending(&start.id));
    }

    #[test]
    fn reset_and_stop_touch_disjoint_state() {
        let mut store = watching("main");
        let start = Task::new(TaskKind::TalkStart, talk("t1", "main"));
        let end = Task::new(TaskKind::TalkEnd, talk("t1", "main"));
        store.admit(start.clone(), Duration::zero());
        store.complete(&end.id);

        store.reset_completed();
        assert_eq!(store.completed_len(), 0);
        assert!(store.is_pending(&start.id));
        assert!(store.is_watching(&AuditoriumId::new("main")));

        store.complete(&end.id);
        store.stop();
        assert_eq!(store.pending_len(), 0);
        assert!(!store.is_watching(&AuditoriumId::new("main")));
        assert!(store.is_completed(&end.id));
    }
}

//! Scheduler - the Generating and Executing phases plus the command surface.
//!
//! One cycle:
//! 1. **Generating**: query the schedule source (no lock held), then admit
//!    primary tasks and their reminders under the task lock.
//! 2. **Executing**: under the lock, pick due tasks; release it; dispatch in
//!    narrative order (optionally a bounded number at a time); record each
//!    completion under the lock as it finishes; persist.
//!
//! Errors never escape a cycle. They are logged, and a best-effort notice
//! goes to the management room.

use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::dispatcher::Dispatcher;
use super::status::{CycleReport, SchedulerStatus};
use super::task_store::{Admission, TaskStore};
use crate::config::SchedulerConfig;
use crate::domain::{AuditoriumId, Result, SchedulerState, Talk, Task, TaskId, TaskKind};
use crate::ports::{Clock, ScheduleSource, StateStore};

/// Reminders seeded from the primary query window, per primary kind.
const START_REMINDERS: [TaskKind; 1] = [TaskKind::TalkStart5M];
const QA_REMINDERS: [TaskKind; 1] = [TaskKind::TalkQa5M];
const END_REMINDERS: [TaskKind; 2] = [TaskKind::TalkEnd5M, TaskKind::TalkEnd1M];

/// Reminders seeded from the wider early-warning window.
const EARLY_REMINDERS: [TaskKind; 5] = [
    TaskKind::TalkStart1H,
    TaskKind::TalkCheckin45M,
    TaskKind::TalkCheckin30M,
    TaskKind::TalkCheckin15M,
    TaskKind::TalkStart5M,
];

/// Talks returned by one round of schedule queries.
struct Snapshot {
    starting: Vec<Talk>,
    qa: Vec<Talk>,
    ending: Vec<Talk>,
    early: Vec<Talk>,
}

pub struct Scheduler {
    config: SchedulerConfig,
    clock: Arc<dyn Clock>,
    source: Arc<dyn ScheduleSource>,
    state_store: Arc<dyn StateStore>,
    dispatcher: Dispatcher,
    tasks: Mutex<TaskStore>,
    persist_lock: Mutex<()>,
}

impl Scheduler {
    pub(crate) fn new(
        config: SchedulerConfig,
        clock: Arc<dyn Clock>,
        source: Arc<dyn ScheduleSource>,
        state_store: Arc<dyn StateStore>,
        dispatcher: Dispatcher,
    ) -> Self {
        let tasks = Mutex::new(TaskStore::new(config.completed_cap));
        Self {
            config,
            clock,
            source,
            state_store,
            dispatcher,
            tasks,
            persist_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Restore completed ids and the watch-list from the state store.
    pub async fn load_state(&self) -> Result<()> {
        let default = SchedulerState::default().to_json()?;
        let value = self.state_store.load(&self.config.state_key, default).await?;
        let state = SchedulerState::from_json(value)?;

        let mut tasks = self.tasks.lock().await;
        tasks.restore(state);
        info!(
            completed = tasks.completed_len(),
            watched = tasks.watched().count(),
            "scheduler state loaded"
        );
        Ok(())
    }

    /// Run one Generating + Executing cycle.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        match self.generate().await {
            Ok(admitted) => report.admitted = admitted,
            Err(e) => {
                report.generation_failed = true;
                error!(error = %e, kind = ?e.kind(), "generating scheduled tasks failed");
                self.notice(format!("Failed to process upcoming talks: {e}"))
                    .await;
            }
        }

        self.execute(&mut report).await;
        report
    }

    /// Admit one task, honoring pending/completed dedup and auditorium gating.
    pub async fn try_schedule_task(&self, kind: TaskKind, talk: &Talk) -> Admission {
        let mut tasks = self.tasks.lock().await;
        self.admit(&mut tasks, kind, talk)
    }

    async fn query(&self) -> Result<Snapshot> {
        let window = self.config.lookahead_minutes;
        Ok(Snapshot {
            starting: self.source.talks_starting_within(window, window).await?,
            qa: self
                .source
                .talks_with_qa_starting_within(window, window)
                .await?,
            ending: self.source.talks_ending_within(window, window).await?,
            early: self
                .source
                .talks_starting_within(
                    self.config.early_lookahead_minutes,
                    self.config.early_lookbehind_minutes,
                )
                .await?,
        })
    }

    /// Run only the Generating phase. Returns how many tasks were admitted.
    pub async fn generate(&self) -> Result<usize> {
        let snapshot = self.query().await?;

        let mut tasks = self.tasks.lock().await;
        let mut admitted = 0;
        for talk in &snapshot.starting {
            admitted += self.admit_chain(&mut tasks, talk, TaskKind::TalkStart, true, &START_REMINDERS);
        }
        for talk in &snapshot.qa {
            admitted += self.admit_chain(&mut tasks, talk, TaskKind::TalkQa, true, &QA_REMINDERS);
        }
        for talk in &snapshot.ending {
            admitted += self.admit_chain(&mut tasks, talk, TaskKind::TalkEnd, true, &END_REMINDERS);
        }
        for talk in &snapshot.early {
            admitted += self.admit_chain(&mut tasks, talk, TaskKind::TalkStart, false, &EARLY_REMINDERS);
        }
        Ok(admitted)
    }

    /// Admit `primary` (when asked) and, unless it already completed, its
    /// reminders. Returns how many tasks entered `pending`.
    fn admit_chain(
        &self,
        tasks: &mut TaskStore,
        talk: &Talk,
        primary: TaskKind,
        include_primary: bool,
        reminders: &[TaskKind],
    ) -> usize {
        let mut admitted = 0;
        if include_primary && self.admit(tasks, primary, talk) == Admission::Admitted {
            admitted += 1;
        }
        if tasks.is_completed(&TaskId::for_talk(primary, talk)) {
            return admitted;
        }
        for &kind in reminders {
            if self.admit(tasks, kind, talk) == Admission::Admitted {
                admitted += 1;
            }
        }
        admitted
    }

    fn admit(&self, tasks: &mut TaskStore, kind: TaskKind, talk: &Talk) -> Admission {
        let task = Task::new(kind, talk.clone());
        let task_id = task.id.clone();
        let admission = tasks.admit(task, self.config.qa_buffer());
        match admission {
            Admission::Admitted => {
                debug!(task_id = %task_id, kind = %kind, talk_id = %talk.id, "task scheduled");
            }
            Admission::NotWatched => {
                warn!(
                    task_id = %task_id,
                    auditorium_id = %talk.auditorium_id,
                    "ignoring task for auditorium that is not being run"
                );
            }
            Admission::NoDueTime => {
                debug!(task_id = %task_id, "talk has no Q&A; task ignored");
            }
            Admission::AlreadyPending | Admission::AlreadyCompleted => {}
        }
        admission
    }

    async fn execute(&self, report: &mut CycleReport) {
        let now = self.clock.now();
        let qa_buffer = self.config.qa_buffer();
        let batch = {
            let mut tasks = self.tasks.lock().await;
            tasks.take_due(now, qa_buffer, self.config.stale_after())
        };

        if batch.discarded > 0 {
            debug!(discarded = batch.discarded, "dropped pending tasks that were already completed");
        }
        for task in &batch.skipped {
            let overdue_secs = task
                .start_time(qa_buffer)
                .map_or(0, |due| (now - due).num_seconds());
            warn!(task_id = %task.id, kind = %task.kind, overdue_secs, "skipping stale reminder");
        }
        report.skipped = batch.skipped.len();

        let mut results = pin!(
            futures::stream::iter(batch.due)
                .map(|task| async move {
                    let result = self.dispatcher.dispatch(&task).await;
                    (task, result)
                })
                .buffered(self.config.dispatch_concurrency.max(1))
        );

        while let Some((task, result)) = results.next().await {
            match result {
                Ok(()) => {
                    info!(task_id = %task.id, kind = %task.kind, talk_id = %task.talk.id, "task dispatched");
                    report.dispatched += 1;
                }
                Err(e) => {
                    error!(task_id = %task.id, kind = %task.kind, error = %e, "task dispatch failed");
                    report.failed += 1;
                    self.notice(format!(
                        "Failed to run {} for {}: {e}",
                        task.kind,
                        task.talk.display_title()
                    ))
                    .await;
                }
            }
            self.tasks.lock().await.complete(&task.id);
        }

        if report.dispatched + report.failed + report.skipped == 0 {
            return;
        }
        if let Err(e) = self.persist().await {
            error!(error = %e, "cannot persist scheduler state");
        }
    }

    async fn notice(&self, text: String) {
        if let Err(e) = self.dispatcher.notify_management(text).await {
            warn!(error = %e, "cannot send notice to management room");
        }
    }

    async fn persist(&self) -> Result<()> {
        let _guard = self.persist_lock.lock().await;
        let state = self.tasks.lock().await.snapshot();
        let value = state.to_json()?;
        self.state_store.save(&self.config.state_key, &value).await?;
        debug!(completed = state.completed_ids.len(), "scheduler state persisted");
        Ok(())
    }

    // ----------------------------------------
    // Command surface
    // ----------------------------------------

    pub async fn add_auditorium(&self, auditorium: AuditoriumId) -> Result<()> {
        let added = self.tasks.lock().await.watch(auditorium.clone());
        info!(auditorium_id = %auditorium, added, "watching auditorium");
        self.persist().await
    }

    pub async fn is_watching_auditorium(&self, auditorium: &AuditoriumId) -> bool {
        self.tasks.lock().await.is_watching(auditorium)
    }

    /// Forget completed ids so already-sent notifications can go out again.
    pub async fn reset(&self) -> Result<()> {
        self.tasks.lock().await.reset_completed();
        info!("completed task history cleared");
        self.persist().await
    }

    /// Drop all pending tasks and stop watching every auditorium.
    pub async fn stop(&self) -> Result<()> {
        self.tasks.lock().await.stop();
        info!("scheduler stopped; watch-list and pending tasks cleared");
        self.persist().await
    }

    /// Pending tasks in the order they would run.
    pub async fn inspect(&self) -> Vec<Task> {
        self.tasks.lock().await.pending_tasks(self.config.qa_buffer())
    }

    /// Completed ids, oldest first.
    pub async fn inspect_completed(&self) -> Vec<TaskId> {
        self.tasks.lock().await.completed_ids()
    }

    pub async fn status(&self) -> SchedulerStatus {
        let tasks = self.tasks.lock().await;
        SchedulerStatus {
            pending: tasks.pending_len(),
            completed: tasks.completed_len(),
            watched_auditoriums: tasks.watched().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Person, PersonRole, RoomId, ScheduleError, UserId};
    use crate::impls::{
        InMemoryCheckinRegistry, InMemoryScheduleSource, InMemoryStateStore, RecordedAction,
        RecordingActionSink, StaticPeopleDirectory, StaticRoomDirectory,
    };
    use crate::ports::FixedClock;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap()
    }

    fn keynote() -> Talk {
        Talk::new("t1", "main", t0(), t0() + Duration::minutes(30))
            .with_title("Keynote")
            .with_qa(t0() + Duration::minutes(20))
    }

    struct Harness {
        clock: Arc<FixedClock>,
        source: Arc<InMemoryScheduleSource>,
        sink: Arc<RecordingActionSink>,
        state: Arc<InMemoryStateStore>,
        scheduler: Scheduler,
    }

    impl Harness {
        fn new(talks: Vec<Talk>) -> Self {
            Self::with_state(talks, Arc::new(InMemoryStateStore::new()))
        }

        fn with_state(talks: Vec<Talk>, state: Arc<InMemoryStateStore>) -> Self {
            let clock = Arc::new(FixedClock::new(t0() - Duration::minutes(10)));
            let source = Arc::new(InMemoryScheduleSource::new(clock.clone(), talks));
            let sink = Arc::new(RecordingActionSink::new());
            let scheduler = build(clock.clone(), source.clone(), sink.clone(), state.clone());
            Self {
                clock,
                source,
                sink,
                state,
                scheduler,
            }
        }

        fn at(&self, offset_minutes: i64) {
            self.clock.set(t0() + Duration::minutes(offset_minutes));
        }

        async fn vote_resets(&self) -> usize {
            self.sink
                .actions()
                .await
                .iter()
                .filter(|a| matches!(a, RecordedAction::VoteBoardReset { .. }))
                .count()
        }
    }

    fn build(
        clock: Arc<FixedClock>,
        source: Arc<dyn ScheduleSource>,
        sink: Arc<RecordingActionSink>,
        state: Arc<dyn StateStore>,
    ) -> Scheduler {
        let rooms = StaticRoomDirectory::new("!mgmt")
            .with_talk_room("t1", "!t1")
            .with_talk_room("t2", "!t2")
            .with_talk_room("t3", "!t3")
            .with_auditorium("main", "!aud", "!backstage");
        let people = StaticPeopleDirectory::new().with_people(
            "t1",
            vec![Person::new(
                "Alice",
                PersonRole::Speaker,
                Some(UserId::new("@alice:example.org")),
            )],
        );
        let dispatcher = Dispatcher::new(
            sink,
            Arc::new(rooms),
            Arc::new(people),
            Arc::new(InMemoryCheckinRegistry::new(clock.clone())),
        );
        Scheduler::new(SchedulerConfig::default(), clock, source, state, dispatcher)
    }

    fn kinds(tasks: &[Task]) -> Vec<TaskKind> {
        tasks.iter().map(|t| t.kind).collect()
    }

    #[tokio::test]
    async fn start_runs_exactly_once_across_polls() {
        let h = Harness::new(vec![keynote()]);
        h.scheduler.add_auditorium("main".into()).await.unwrap();

        // 10 minutes before: the check-in nag is due, older reminders are stale.
        let report = h.scheduler.run_cycle().await;
        assert_eq!(report.dispatched, 1);
        assert_eq!(report.skipped, 3);
        assert_eq!(
            kinds(&h.scheduler.inspect().await),
            vec![TaskKind::TalkStart5M, TaskKind::TalkStart]
        );
        assert_eq!(h.vote_resets().await, 0);

        h.at(1);
        let report = h.scheduler.run_cycle().await;
        assert_eq!(report.dispatched, 2);
        assert_eq!(h.vote_resets().await, 1);
        assert!(h.scheduler.inspect().await.is_empty());

        h.at(2);
        h.scheduler.run_cycle().await;
        assert_eq!(h.vote_resets().await, 1);

        let start = TaskId::for_talk(TaskKind::TalkStart, &keynote());
        let completed = h.scheduler.inspect_completed().await;
        assert_eq!(completed.iter().filter(|id| **id == start).count(), 1);
    }

    #[tokio::test]
    async fn stale_reminder_is_dropped_but_primary_still_runs() {
        let h = Harness::new(vec![]);
        h.scheduler.add_auditorium("main".into()).await.unwrap();
        let now = h.clock.now();

        let upcoming = Talk::new("t2", "main", now + Duration::minutes(19), now + Duration::minutes(49));
        let finished = Talk::new("t3", "main", now - Duration::minutes(41), now - Duration::minutes(11));
        assert_eq!(
            h.scheduler.try_schedule_task(TaskKind::TalkCheckin30M, &upcoming).await,
            Admission::Admitted
        );
        assert_eq!(
            h.scheduler.try_schedule_task(TaskKind::TalkEnd, &finished).await,
            Admission::Admitted
        );

        let report = h.scheduler.run_cycle().await;
        assert_eq!(report.skipped, 1);
        assert_eq!(report.dispatched, 1);

        let completed = h.scheduler.inspect_completed().await;
        assert!(completed.contains(&TaskId::for_talk(TaskKind::TalkCheckin30M, &upcoming)));
        assert!(completed.contains(&TaskId::for_talk(TaskKind::TalkEnd, &finished)));
        assert!(h.sink.messages_in(&RoomId::new("!t2")).await.is_empty());
        assert!(
            h.sink
                .actions()
                .await
                .contains(&RecordedAction::MadePublic { room: RoomId::new("!t3") })
        );
    }

    #[tokio::test]
    async fn unwatched_auditorium_is_ignored() {
        let h = Harness::new(vec![keynote()]);
        h.at(1);

        assert_eq!(
            h.scheduler.try_schedule_task(TaskKind::TalkStart, &keynote()).await,
            Admission::NotWatched
        );
        let report = h.scheduler.run_cycle().await;
        assert_eq!(report.admitted, 0);
        assert!(h.sink.actions().await.is_empty());
    }

    #[tokio::test]
    async fn all_watches_every_auditorium() {
        let h = Harness::new(vec![keynote()]);
        h.scheduler.add_auditorium("all".into()).await.unwrap();
        assert!(h.scheduler.is_watching_auditorium(&"main".into()).await);

        h.at(1);
        h.scheduler.run_cycle().await;
        assert_eq!(h.vote_resets().await, 1);
    }

    #[tokio::test]
    async fn reset_lets_completed_tasks_run_again() {
        let h = Harness::new(vec![keynote()]);
        h.scheduler.add_auditorium("main".into()).await.unwrap();
        h.at(1);
        h.scheduler.run_cycle().await;
        assert_eq!(h.vote_resets().await, 1);

        h.scheduler.reset().await.unwrap();
        assert!(h.scheduler.inspect_completed().await.is_empty());
        assert!(h.scheduler.is_watching_auditorium(&"main".into()).await);

        h.scheduler.run_cycle().await;
        assert_eq!(h.vote_resets().await, 2);
    }

    #[tokio::test]
    async fn stop_clears_pending_and_watch_list() {
        let h = Harness::new(vec![keynote()]);
        h.scheduler.add_auditorium("main".into()).await.unwrap();
        h.scheduler.run_cycle().await;
        assert!(!h.scheduler.inspect().await.is_empty());

        h.scheduler.stop().await.unwrap();
        let status = h.scheduler.status().await;
        assert_eq!(status.pending, 0);
        assert!(status.watched_auditoriums.is_empty());

        h.at(1);
        h.scheduler.run_cycle().await;
        assert_eq!(h.vote_resets().await, 0);
    }

    #[tokio::test]
    async fn completed_ids_survive_restart() {
        let h = Harness::new(vec![keynote()]);
        h.scheduler.add_auditorium("main".into()).await.unwrap();
        h.at(1);
        h.scheduler.run_cycle().await;
        let before = h.scheduler.inspect_completed().await;
        assert!(!before.is_empty());

        let restarted = Harness::with_state(vec![keynote()], h.state.clone());
        restarted.scheduler.load_state().await.unwrap();
        assert_eq!(restarted.scheduler.inspect_completed().await, before);
        assert!(restarted.scheduler.is_watching_auditorium(&"main".into()).await);

        restarted.at(2);
        restarted.scheduler.run_cycle().await;
        assert_eq!(restarted.vote_resets().await, 0);
    }

    #[tokio::test]
    async fn failed_dispatch_is_completed_and_reported() {
        let h = Harness::new(vec![keynote()]);
        h.scheduler.add_auditorium("main".into()).await.unwrap();
        h.sink.fail_room("!aud").await;
        h.at(1);

        let report = h.scheduler.run_cycle().await;
        assert!(report.failed >= 1);
        let start = TaskId::for_talk(TaskKind::TalkStart, &keynote());
        assert!(h.scheduler.inspect_completed().await.contains(&start));

        let notices = h.sink.messages_in(&RoomId::new("!mgmt")).await;
        assert!(notices.iter().any(|m| m.text.contains("Failed to run talk_start")));

        let report = h.scheduler.run_cycle().await;
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn qa_tasks_follow_the_qa_window() {
        let h = Harness::new(vec![keynote()]);
        h.scheduler.add_auditorium("main".into()).await.unwrap();
        h.at(16);
        let report = h.scheduler.run_cycle().await;
        assert_eq!(report.dispatched, 1);

        let pending = kinds(&h.scheduler.inspect().await);
        assert_eq!(
            pending,
            vec![
                TaskKind::TalkQa,
                TaskKind::TalkEnd5M,
                TaskKind::TalkEnd1M,
                TaskKind::TalkEnd
            ]
        );
        let qa_soon = TaskId::for_talk(TaskKind::TalkQa5M, &keynote());
        assert!(h.scheduler.inspect_completed().await.contains(&qa_soon));

        // Q&A-less talks never produce Q&A tasks.
        let bare = Talk::new("t2", "main", t0(), t0() + Duration::minutes(30));
        h.source.push(bare.clone()).await;
        assert_eq!(
            h.scheduler.try_schedule_task(TaskKind::TalkQa, &bare).await,
            Admission::NoDueTime
        );
    }

    #[tokio::test]
    async fn state_is_persisted_under_configured_key() {
        let h = Harness::new(vec![]);
        h.scheduler.add_auditorium("main".into()).await.unwrap();

        let saved = h
            .state
            .load("scheduler", serde_json::Value::Null)
            .await
            .unwrap();
        let state = SchedulerState::from_json(saved).unwrap();
        assert!(state.watched_auditoriums.contains(&AuditoriumId::new("main")));
    }

    struct BrokenSource;

    #[async_trait]
    impl ScheduleSource for BrokenSource {
        async fn talks_starting_within(&self, _: i64, _: i64) -> Result<Vec<Talk>> {
            Err(ScheduleError::Source("schedule API unreachable".into()))
        }
        async fn talks_with_qa_starting_within(&self, _: i64, _: i64) -> Result<Vec<Talk>> {
            Ok(vec![])
        }
        async fn talks_ending_within(&self, _: i64, _: i64) -> Result<Vec<Talk>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn source_failure_keeps_pending_and_notifies() {
        let clock = Arc::new(FixedClock::new(t0() + Duration::minutes(1)));
        let sink = Arc::new(RecordingActionSink::new());
        let scheduler = build(
            clock,
            Arc::new(BrokenSource),
            sink.clone(),
            Arc::new(InMemoryStateStore::new()),
        );
        scheduler.add_auditorium("main".into()).await.unwrap();
        scheduler
            .try_schedule_task(TaskKind::TalkStart, &keynote())
            .await;

        let report = scheduler.run_cycle().await;
        assert!(report.generation_failed);
        assert_eq!(report.dispatched, 1);

        let notices = sink.messages_in(&RoomId::new("!mgmt")).await;
        assert!(notices[0].text.contains("schedule API unreachable"));
    }
}

//! Status - inspect 用のビュー
//!
//! Serializable snapshots of the engine for the command layer and the CLI.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{AuditoriumId, TalkId, Task, TaskId, TaskKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTaskView {
    pub id: TaskId,
    pub kind: TaskKind,
    pub talk_id: TalkId,
    pub auditorium_id: AuditoriumId,
    pub due_at: Option<DateTime<Utc>>,
}

impl PendingTaskView {
    pub fn from_task(task: &Task, qa_buffer: Duration) -> Self {
        Self {
            id: task.id.clone(),
            kind: task.kind,
            talk_id: task.talk.id.clone(),
            auditorium_id: task.talk.auditorium_id.clone(),
            due_at: task.start_time(qa_buffer),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub pending: usize,
    pub completed: usize,
    pub watched_auditoriums: Vec<AuditoriumId>,
}

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub admitted: usize,
    pub dispatched: usize,
    pub failed: usize,
    pub skipped: usize,
    pub generation_failed: bool,
}

impl CycleReport {
    pub fn has_activity(&self) -> bool {
        self.admitted + self.dispatched + self.failed + self.skipped > 0 || self.generation_failed
    }
}

//! Task - one scheduled notification for one talk.
//!
//! A task's id is derived from `(kind, talk id, auditorium id)` and nothing
//! else, so deriving the same logical event twice always yields the same id.
//! That id is the idempotency key for admission and completion.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AuditoriumId, TalkId};
use super::talk::Talk;
use super::task_kind::{Anchor, TaskKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// `{kind}:{talk}:{auditorium}` with `%` and `:` escaped in the two
    /// free-form components, which keeps the mapping injective.
    pub fn derive(kind: TaskKind, talk: &TalkId, auditorium: &AuditoriumId) -> Self {
        Self(format!(
            "{}:{}:{}",
            kind.as_str(),
            escape_component(talk.as_str()),
            escape_component(auditorium.as_str())
        ))
    }

    pub fn for_talk(kind: TaskKind, talk: &Talk) -> Self {
        Self::derive(kind, &talk.id, &talk.auditorium_id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            other => out.push(other),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    pub talk: Talk,
}

impl Task {
    pub fn new(kind: TaskKind, talk: Talk) -> Self {
        Self {
            id: TaskId::for_talk(kind, &talk),
            kind,
            talk,
        }
    }

    pub fn start_time(&self, qa_buffer: Duration) -> Option<DateTime<Utc>> {
        start_time_of(self.kind, &self.talk, qa_buffer)
    }
}

/// When a task of `kind` for `talk` becomes due.
///
/// Q&A kinds are measured from `qa_start + qa_buffer`; they have no due time
/// when the talk has Q&A disabled.
pub fn start_time_of(kind: TaskKind, talk: &Talk, qa_buffer: Duration) -> Option<DateTime<Utc>> {
    let anchor = match kind.anchor() {
        Anchor::Start => talk.start,
        Anchor::Qa => talk.qa_start? + qa_buffer,
        Anchor::End => talk.end,
    };
    Some(anchor - kind.lead())
}

/// Stable sort by due time, ties broken by narrative order.
///
/// Tasks without a due time sort last.
pub fn sort_tasks(tasks: &mut [Task], qa_buffer: Duration) {
    tasks.sort_by_key(|task| {
        (
            task.start_time(qa_buffer).map_or(i64::MAX, |at| at.timestamp_millis()),
            task.kind.narrative_rank(),
        )
    });
}

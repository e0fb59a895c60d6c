//! TaskKind - the eleven things that can happen around a talk.
//!
//! Every kind is anchored on one instant of the talk (start, Q&A start or
//! end) and fires a fixed lead time before it. Three kinds are primary
//! events (lead time zero); the rest are reminders derived from one of them.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Which instant of a talk a task is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Start,
    Qa,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskKind {
    #[serde(rename = "talk_start_1h")]
    TalkStart1H,
    #[serde(rename = "talk_checkin_45m")]
    TalkCheckin45M,
    #[serde(rename = "talk_checkin_30m")]
    TalkCheckin30M,
    #[serde(rename = "talk_checkin_15m")]
    TalkCheckin15M,
    #[serde(rename = "talk_start_5m")]
    TalkStart5M,
    #[serde(rename = "talk_start")]
    TalkStart,
    #[serde(rename = "talk_qa_5m")]
    TalkQa5M,
    #[serde(rename = "talk_qa")]
    TalkQa,
    #[serde(rename = "talk_end_5m")]
    TalkEnd5M,
    #[serde(rename = "talk_end_1m")]
    TalkEnd1M,
    #[serde(rename = "talk_end")]
    TalkEnd,
}

/// Tie-break order for tasks due at the same instant.
///
/// The end of the current talk reads before the start of the next one.
pub const NARRATIVE_ORDER: [TaskKind; 11] = [
    TaskKind::TalkEnd5M,
    TaskKind::TalkEnd1M,
    TaskKind::TalkEnd,
    TaskKind::TalkQa5M,
    TaskKind::TalkQa,
    TaskKind::TalkStart1H,
    TaskKind::TalkCheckin45M,
    TaskKind::TalkCheckin30M,
    TaskKind::TalkCheckin15M,
    TaskKind::TalkStart5M,
    TaskKind::TalkStart,
];

impl TaskKind {
    pub const ALL: [TaskKind; 11] = [
        TaskKind::TalkStart1H,
        TaskKind::TalkCheckin45M,
        TaskKind::TalkCheckin30M,
        TaskKind::TalkCheckin15M,
        TaskKind::TalkStart5M,
        TaskKind::TalkStart,
        TaskKind::TalkQa5M,
        TaskKind::TalkQa,
        TaskKind::TalkEnd5M,
        TaskKind::TalkEnd1M,
        TaskKind::TalkEnd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::TalkStart1H => "talk_start_1h",
            TaskKind::TalkCheckin45M => "talk_checkin_45m",
            TaskKind::TalkCheckin30M => "talk_checkin_30m",
            TaskKind::TalkCheckin15M => "talk_checkin_15m",
            TaskKind::TalkStart5M => "talk_start_5m",
            TaskKind::TalkStart => "talk_start",
            TaskKind::TalkQa5M => "talk_qa_5m",
            TaskKind::TalkQa => "talk_qa",
            TaskKind::TalkEnd5M => "talk_end_5m",
            TaskKind::TalkEnd1M => "talk_end_1m",
            TaskKind::TalkEnd => "talk_end",
        }
    }

    pub fn anchor(self) -> Anchor {
        match self {
            TaskKind::TalkStart1H
            | TaskKind::TalkCheckin45M
            | TaskKind::TalkCheckin30M
            | TaskKind::TalkCheckin15M
            | TaskKind::TalkStart5M
            | TaskKind::TalkStart => Anchor::Start,
            TaskKind::TalkQa5M | TaskKind::TalkQa => Anchor::Qa,
            TaskKind::TalkEnd5M | TaskKind::TalkEnd1M | TaskKind::TalkEnd => Anchor::End,
        }
    }

    /// How long before its anchor the task fires.
    pub fn lead(self) -> Duration {
        match self {
            TaskKind::TalkStart1H => Duration::minutes(60),
            TaskKind::TalkCheckin45M => Duration::minutes(45),
            TaskKind::TalkCheckin30M => Duration::minutes(30),
            TaskKind::TalkCheckin15M => Duration::minutes(15),
            TaskKind::TalkStart5M | TaskKind::TalkQa5M | TaskKind::TalkEnd5M => {
                Duration::minutes(5)
            }
            TaskKind::TalkEnd1M => Duration::minutes(1),
            TaskKind::TalkStart | TaskKind::TalkQa | TaskKind::TalkEnd => Duration::zero(),
        }
    }

    /// The primary event this kind belongs to (itself for primaries).
    pub fn primary(self) -> TaskKind {
        match self.anchor() {
            Anchor::Start => TaskKind::TalkStart,
            Anchor::Qa => TaskKind::TalkQa,
            Anchor::End => TaskKind::TalkEnd,
        }
    }

    pub fn is_primary(self) -> bool {
        self.primary() == self
    }

    /// Nice-to-have reminders that are not worth sending late.
    pub fn is_skippable(self) -> bool {
        matches!(
            self,
            TaskKind::TalkStart1H | TaskKind::TalkCheckin45M | TaskKind::TalkCheckin30M
        )
    }

    pub fn is_checkin(self) -> bool {
        matches!(
            self,
            TaskKind::TalkCheckin45M | TaskKind::TalkCheckin30M | TaskKind::TalkCheckin15M
        )
    }

    /// Position in [`NARRATIVE_ORDER`].
    pub fn narrative_rank(self) -> usize {
        match self {
            TaskKind::TalkEnd5M => 0,
            TaskKind::TalkEnd1M => 1,
            TaskKind::TalkEnd => 2,
            TaskKind::TalkQa5M => 3,
            TaskKind::TalkQa => 4,
            TaskKind::TalkStart1H => 5,
            TaskKind::TalkCheckin45M => 6,
            TaskKind::TalkCheckin30M => 7,
            TaskKind::TalkCheckin15M => 8,
            TaskKind::TalkStart5M => 9,
            TaskKind::TalkStart => 10,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task kind: {0}")]
pub struct UnknownTaskKind(pub String);

impl FromStr for TaskKind {
    type Err = UnknownTaskKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownTaskKind(s.to_string()))
    }
}

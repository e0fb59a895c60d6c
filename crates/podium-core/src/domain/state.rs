//! SchedulerState - what survives a restart.
//!
//! Only the completed-id history and the watch-list are persisted. Pending
//! tasks are rebuilt by the next generation pass, filtered against the
//! completed ids.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ids::AuditoriumId;
use super::task::TaskId;

/// How many completed task ids are remembered.
pub const DEFAULT_COMPLETED_CAP: usize = 200;

/// Watch-list entry that watches every auditorium.
pub const ALL_AUDITORIUMS: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerState {
    /// Oldest first.
    #[serde(default)]
    pub completed_ids: Vec<TaskId>,

    #[serde(default)]
    pub watched_auditoriums: BTreeSet<AuditoriumId>,
}

impl SchedulerState {
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task_kind::TaskKind;
    use crate::domain::ids::TalkId;

    #[test]
    fn persisted_shape_is_camel_case() {
        let state = SchedulerState {
            completed_ids: vec![TaskId::derive(
                TaskKind::TalkEnd,
                &TalkId::new("t1"),
                &AuditoriumId::new("main"),
            )],
            watched_auditoriums: [AuditoriumId::new(ALL_AUDITORIUMS)].into_iter().collect(),
        };

        let json = state.to_json().unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "completedIds": ["talk_end:t1:main"],
                "watchedAuditoriums": ["all"],
            })
        );
        assert_eq!(SchedulerState::from_json(json).unwrap(), state);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let state = SchedulerState::from_json(serde_json::json!({})).unwrap();
        assert_eq!(state, SchedulerState::default());
    }
}

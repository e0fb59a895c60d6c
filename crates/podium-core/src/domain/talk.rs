//! Talk record as handed over by the schedule source.
//!
//! The engine only reads talks. All instants are absolute; on the wire they
//! are milliseconds since the Unix epoch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AuditoriumId, TalkId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Talk {
    pub id: TalkId,
    pub auditorium_id: AuditoriumId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end: DateTime<Utc>,

    /// `None` when the talk has Q&A disabled.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub qa_start: Option<DateTime<Utc>>,

    #[serde(default)]
    pub prerecorded: bool,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub livestream_end: DateTime<Utc>,
}

impl Talk {
    /// A prerecorded talk without Q&A whose livestream ends with the talk.
    pub fn new(
        id: impl Into<TalkId>,
        auditorium_id: impl Into<AuditoriumId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            auditorium_id: auditorium_id.into(),
            title: None,
            start,
            end,
            qa_start: None,
            prerecorded: true,
            livestream_end: end,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_qa(mut self, qa_start: DateTime<Utc>) -> Self {
        self.qa_start = Some(qa_start);
        self
    }

    /// Marks the talk as given live, so the talk slot itself is the Q&A.
    pub fn live(mut self) -> Self {
        self.prerecorded = false;
        self
    }

    pub fn with_livestream_end(mut self, at: DateTime<Utc>) -> Self {
        self.livestream_end = at;
        self
    }

    pub fn has_qa(&self) -> bool {
        self.qa_start.is_some()
    }

    /// Title for announcements, falling back to the talk id.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn talk_reads_millisecond_timestamps() {
        let json = serde_json::json!({
            "id": "t1",
            "auditoriumId": "main",
            "title": "Rust at scale",
            "start": 1_700_000_000_000_i64,
            "end": 1_700_001_800_000_i64,
            "qaStart": 1_700_001_200_000_i64,
            "prerecorded": false,
            "livestreamEnd": 1_700_002_000_000_i64,
        });

        let talk: Talk = serde_json::from_value(json).unwrap();
        assert_eq!(talk.id.as_str(), "t1");
        assert_eq!(talk.start, Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        assert_eq!(
            talk.qa_start,
            Some(Utc.timestamp_millis_opt(1_700_001_200_000).unwrap())
        );
        assert!(!talk.prerecorded);
        assert_eq!(talk.display_title(), "Rust at scale");
    }

    #[test]
    fn missing_qa_means_qa_disabled() {
        let json = serde_json::json!({
            "id": "t2",
            "auditoriumId": "main",
            "start": 0,
            "end": 60_000,
            "livestreamEnd": 60_000,
        });

        let talk: Talk = serde_json::from_value(json).unwrap();
        assert!(!talk.has_qa());
        assert!(!talk.prerecorded);
        assert_eq!(talk.display_title(), "t2");
    }
}

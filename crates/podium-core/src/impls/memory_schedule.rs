//! InMemoryScheduleSource - 固定のトーク一覧から窓で絞り込むスケジュール
//!
//! Used by the CLI (talks loaded from a JSON file) and by tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::domain::{Result, Talk};
use crate::ports::{Clock, ScheduleSource};

pub struct InMemoryScheduleSource {
    talks: RwLock<Vec<Talk>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryScheduleSource {
    pub fn new(clock: Arc<dyn Clock>, talks: Vec<Talk>) -> Self {
        Self {
            talks: RwLock::new(talks),
            clock,
        }
    }

    pub async fn replace(&self, talks: Vec<Talk>) {
        *self.talks.write().await = talks;
    }

    pub async fn push(&self, talk: Talk) {
        self.talks.write().await.push(talk);
    }

    async fn select(
        &self,
        minutes_ahead: i64,
        minutes_behind: i64,
        instant: impl Fn(&Talk) -> Option<DateTime<Utc>>,
    ) -> Vec<Talk> {
        let now = self.clock.now();
        let from = now - Duration::minutes(minutes_behind);
        let until = now + Duration::minutes(minutes_ahead);

        self.talks
            .read()
            .await
            .iter()
            .filter(|talk| instant(talk).is_some_and(|at| at >= from && at <= until))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ScheduleSource for InMemoryScheduleSource {
    async fn talks_starting_within(
        &self,
        minutes_ahead: i64,
        minutes_behind: i64,
    ) -> Result<Vec<Talk>> {
        Ok(self
            .select(minutes_ahead, minutes_behind, |talk| Some(talk.start))
            .await)
    }

    async fn talks_with_qa_starting_within(
        &self,
        minutes_ahead: i64,
        minutes_behind: i64,
    ) -> Result<Vec<Talk>> {
        Ok(self
            .select(minutes_ahead, minutes_behind, |talk| talk.qa_start)
            .await)
    }

    async fn talks_ending_within(
        &self,
        minutes_ahead: i64,
        minutes_behind: i64,
    ) -> Result<Vec<Talk>> {
        Ok(self
            .select(minutes_ahead, minutes_behind, |talk| Some(talk.end))
            .await)
    }
}

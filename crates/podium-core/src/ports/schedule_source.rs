//! ScheduleSource port - 近い将来のトークを問い合わせる
//!
//! The engine polls this every cycle. Each query returns the talks whose
//! respective instant lies in `[now - minutes_behind, now + minutes_ahead]`.
//! Implementations must tolerate being called repeatedly and return a
//! consistent snapshot; an error leaves the engine's state untouched.

use async_trait::async_trait;

use crate::domain::{Result, Talk};

#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn talks_starting_within(
        &self,
        minutes_ahead: i64,
        minutes_behind: i64,
    ) -> Result<Vec<Talk>>;

    async fn talks_with_qa_starting_within(
        &self,
        minutes_ahead: i64,
        minutes_behind: i64,
    ) -> Result<Vec<Talk>>;

    async fn talks_ending_within(
        &self,
        minutes_ahead: i64,
        minutes_behind: i64,
    ) -> Result<Vec<Talk>>;
}

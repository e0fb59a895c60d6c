//! CheckinRegistry port - 登壇者のチェックイン状態
//!
//! A check-in is a liveness signal derived from room activity. The registry
//! is owned outside the engine; the engine only asks and re-arms.

use async_trait::async_trait;

use crate::domain::{Result, UserId};

#[async_trait]
pub trait CheckinRegistry: Send + Sync {
    async fn is_checked_in(&self, user: &UserId) -> Result<bool>;

    /// Register that these users are expected to check in, so their next
    /// activity counts.
    async fn expect_checkin_from(&self, users: &[UserId]) -> Result<()>;
}

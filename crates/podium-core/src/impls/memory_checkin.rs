//! InMemoryCheckinRegistry - 発言をチェックインとみなす台帳
//!
//! A user is checked in when they were active (spoke in any room the bot
//! watches) within `validity` of now. Activity only counts for users the
//! engine is expecting; `expect_checkin_from` arms them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::domain::{Result, UserId};
use crate::ports::{CheckinRegistry, Clock};

/// Default window a check-in stays valid for.
pub const DEFAULT_CHECKIN_VALIDITY_MINUTES: i64 = 120;

#[derive(Default)]
struct Ledger {
    expected: HashSet<UserId>,
    last_seen: HashMap<UserId, DateTime<Utc>>,
}

pub struct InMemoryCheckinRegistry {
    clock: Arc<dyn Clock>,
    validity: Duration,
    ledger: Mutex<Ledger>,
}

impl InMemoryCheckinRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_validity(clock, Duration::minutes(DEFAULT_CHECKIN_VALIDITY_MINUTES))
    }

    pub fn with_validity(clock: Arc<dyn Clock>, validity: Duration) -> Self {
        Self {
            clock,
            validity,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Called by the chat layer whenever `user` says something.
    /// Returns whether the activity counted as a check-in.
    pub async fn record_activity(&self, user: &UserId) -> bool {
        let now = self.clock.now();
        let mut ledger = self.ledger.lock().await;
        if !ledger.expected.contains(user) {
            return false;
        }
        ledger.last_seen.insert(user.clone(), now);
        true
    }
}

#[async_trait]
impl CheckinRegistry for InMemoryCheckinRegistry {
    async fn is_checked_in(&self, user: &UserId) -> Result<bool> {
        let now = self.clock.now();
        let ledger = self.ledger.lock().await;
        Ok(ledger
            .last_seen
            .get(user)
            .is_some_and(|seen| now - *seen <= self.validity))
    }

    async fn expect_checkin_from(&self, users: &[UserId]) -> Result<()> {
        let mut ledger = self.ledger.lock().await;
        ledger.expected.extend(users.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FixedClock;
    use chrono::TimeZone;

    fn setup() -> (Arc<FixedClock>, InMemoryCheckinRegistry) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap(),
        ));
        let registry = InMemoryCheckinRegistry::with_validity(clock.clone(), Duration::minutes(30));
        (clock, registry)
    }

    #[tokio::test]
    async fn activity_only_counts_once_expected() {
        let (_clock, registry) = setup();
        let alice = UserId::new("@alice:example.org");

        assert!(!registry.record_activity(&alice).await);
        assert!(!registry.is_checked_in(&alice).await.unwrap());

        registry.expect_checkin_from(&[alice.clone()]).await.unwrap();
        assert!(registry.record_activity(&alice).await);
        assert!(registry.is_checked_in(&alice).await.unwrap());
    }

    #[tokio::test]
    async fn check_in_expires_after_validity() {
        let (clock, registry) = setup();
        let bob = UserId::new("@bob:example.org");
        registry.expect_checkin_from(&[bob.clone()]).await.unwrap();
        registry.record_activity(&bob).await;

        clock.advance(Duration::minutes(31));
        assert!(!registry.is_checked_in(&bob).await.unwrap());
    }
}

//! SchedulerBuilder - ポートのワイヤリングと起動時検証
//!
//! # Fail-fast 設計
//! - 必須ポートが欠けていれば build() が BuildError を返す
//! - 設定値の矛盾も build() 時に検出する

use std::sync::Arc;

use super::dispatcher::Dispatcher;
use super::scheduler::Scheduler;
use crate::config::SchedulerConfig;
use crate::ports::{
    ActionSink, CheckinRegistry, Clock, PeopleDirectory, RoomDirectory, ScheduleSource,
    StateStore, SystemClock,
};

/// SchedulerBuilder は Scheduler を構築
///
/// # 使用例
/// ```ignore
/// let scheduler = SchedulerBuilder::new(config)
///     .schedule_source(source)
///     .state_store(store)
///     .action_sink(sink)
///     .room_directory(rooms)
///     .people_directory(people)
///     .checkin_registry(checkins)
///     .build()?;
/// ```
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    clock: Option<Arc<dyn Clock>>,
    source: Option<Arc<dyn ScheduleSource>>,
    state_store: Option<Arc<dyn StateStore>>,
    sink: Option<Arc<dyn ActionSink>>,
    rooms: Option<Arc<dyn RoomDirectory>>,
    people: Option<Arc<dyn PeopleDirectory>>,
    checkins: Option<Arc<dyn CheckinRegistry>>,
}

/// BuildError は構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing components: {0:?}. These ports must be provided before build().")]
    MissingComponents(Vec<&'static str>),

    #[error("Invalid config: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}

impl SchedulerBuilder {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            clock: None,
            source: None,
            state_store: None,
            sink: None,
            rooms: None,
            people: None,
            checkins: None,
        }
    }

    /// 省略時は SystemClock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn schedule_source(mut self, source: Arc<dyn ScheduleSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn state_store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.state_store = Some(store);
        self
    }

    pub fn action_sink(mut self, sink: Arc<dyn ActionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn room_directory(mut self, rooms: Arc<dyn RoomDirectory>) -> Self {
        self.rooms = Some(rooms);
        self
    }

    pub fn people_directory(mut self, people: Arc<dyn PeopleDirectory>) -> Self {
        self.people = Some(people);
        self
    }

    pub fn checkin_registry(mut self, checkins: Arc<dyn CheckinRegistry>) -> Self {
        self.checkins = Some(checkins);
        self
    }

    /// # 検証
    /// - 必須ポートが全て揃っているか
    /// - SchedulerConfig::problems() が空か
    pub fn build(self) -> Result<Scheduler, BuildError> {
        let mut missing = Vec::new();
        if self.source.is_none() {
            missing.push("schedule_source");
        }
        if self.state_store.is_none() {
            missing.push("state_store");
        }
        if self.sink.is_none() {
            missing.push("action_sink");
        }
        if self.rooms.is_none() {
            missing.push("room_directory");
        }
        if self.people.is_none() {
            missing.push("people_directory");
        }
        if self.checkins.is_none() {
            missing.push("checkin_registry");
        }

        let (Some(source), Some(state_store), Some(sink), Some(rooms), Some(people), Some(checkins)) = (
            self.source,
            self.state_store,
            self.sink,
            self.rooms,
            self.people,
            self.checkins,
        ) else {
            return Err(BuildError::MissingComponents(missing));
        };

        let problems = self.config.problems();
        if !problems.is_empty() {
            return Err(BuildError::InvalidConfig(problems));
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let dispatcher = Dispatcher::new(sink, rooms, people, checkins);
        Ok(Scheduler::new(self.config, clock, source, state_store, dispatcher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{
        InMemoryCheckinRegistry, InMemoryScheduleSource, InMemoryStateStore, StaticPeopleDirectory,
        StaticRoomDirectory, TracingActionSink,
    };

    fn complete(config: SchedulerConfig) -> SchedulerBuilder {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        SchedulerBuilder::new(config)
            .schedule_source(Arc::new(InMemoryScheduleSource::new(clock.clone(), vec![])))
            .state_store(Arc::new(InMemoryStateStore::new()))
            .action_sink(Arc::new(TracingActionSink))
            .room_directory(Arc::new(StaticRoomDirectory::new("!mgmt")))
            .people_directory(Arc::new(StaticPeopleDirectory::new()))
            .checkin_registry(Arc::new(InMemoryCheckinRegistry::new(clock)))
    }

    #[test]
    fn test_build_success() {
        assert!(complete(SchedulerConfig::default()).build().is_ok());
    }

    #[test]
    fn test_build_missing_components() {
        let result = SchedulerBuilder::new(SchedulerConfig::default())
            .state_store(Arc::new(InMemoryStateStore::new()))
            .action_sink(Arc::new(TracingActionSink))
            .build();
        assert!(matches!(
            result,
            Err(BuildError::MissingComponents(missing))
                if missing == vec!["schedule_source", "room_directory", "people_directory", "checkin_registry"]
        ));
    }

    #[test]
    fn test_build_invalid_config() {
        let config = SchedulerConfig {
            poll_interval_secs: 0,
            ..SchedulerConfig::default()
        };
        assert!(matches!(
            complete(config).build(),
            Err(BuildError::InvalidConfig(problems)) if !problems.is_empty()
        ));
    }
}

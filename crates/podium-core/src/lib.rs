//! podium-core
//!
//! Conference talk schedule engine: turns an upcoming-talk schedule into
//! timed chat actions (reminders, check-in nags, announcements, room opening).
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, talk, task_kind, task, state, rooms, errors）
//! - **ports**: 抽象化レイヤー（ScheduleSource, StateStore, ActionSink, RoomDirectory, など）
//! - **app**: アプリケーションロジック（builder, scheduler, task_store, dispatcher, runner）
//! - **impls**: 実装（インメモリ / JSON ファイル / ログ出力）
//! - **config**: SchedulerConfig（TOML）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{BuildError, Scheduler, SchedulerBuilder, SchedulerLoop};
pub use config::{ConfigError, SchedulerConfig};

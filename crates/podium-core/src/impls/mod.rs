//! Impls - ports の実装（開発用・テスト用・CLI 用）
//!
//! # 含まれる実装
//! - **InMemoryScheduleSource**: 固定トーク一覧
//! - **InMemoryStateStore** / **JsonFileStateStore**: 永続化
//! - **StaticRoomDirectory** / **StaticPeopleDirectory**: 設定ファイル由来の対応表
//! - **InMemoryCheckinRegistry**: チェックイン台帳
//! - **TracingActionSink**: ログに書くだけの ActionSink
//! - **RecordingActionSink**: アクションを記録する ActionSink
//!
//! 本番のチャットサーバー連携は別クレートに置きます。

pub mod json_file_state;
pub mod memory_checkin;
pub mod memory_schedule;
pub mod memory_state;
pub mod recording_sink;
pub mod static_people;
pub mod static_rooms;
pub mod tracing_sink;

pub use self::json_file_state::JsonFileStateStore;
pub use self::memory_checkin::InMemoryCheckinRegistry;
pub use self::memory_schedule::InMemoryScheduleSource;
pub use self::memory_state::InMemoryStateStore;
pub use self::recording_sink::{RecordedAction, RecordingActionSink};
pub use self::static_people::StaticPeopleDirectory;
pub use self::static_rooms::StaticRoomDirectory;
pub use self::tracing_sink::TracingActionSink;

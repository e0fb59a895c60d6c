//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! スケジューラは外部システム（スケジュール、永続化、チャットサーバー、
//! チェックイン台帳）にこれらの trait 越しにしか触れません。
//! 依存はすべてコンストラクタで注入します（グローバル状態なし）。

pub mod action_sink;
pub mod checkins;
pub mod clock;
pub mod people;
pub mod rooms;
pub mod schedule_source;
pub mod state_store;

pub use self::action_sink::ActionSink;
pub use self::checkins::CheckinRegistry;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::people::PeopleDirectory;
pub use self::rooms::RoomDirectory;
pub use self::schedule_source::ScheduleSource;
pub use self::state_store::StateStore;

//! App - アプリケーション層
//!
//! ports を組み合わせてスケジューラのロジックを実装します。
//!
//! # 主要コンポーネント
//! - **SchedulerBuilder**: ポートのワイヤリングと起動時検証
//! - **Scheduler**: Generating / Executing の 1 周期とコマンド面
//! - **TaskStore**: pending / completed / watch-list の状態
//! - **Dispatcher**: TaskKind ごとのチャット操作
//! - **SchedulerLoop**: 周期実行と shutdown

pub mod builder;
pub mod dispatcher;
pub mod runner;
pub mod scheduler;
pub mod status;
pub mod task_store;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, SchedulerBuilder};
pub use self::dispatcher::Dispatcher;
pub use self::runner::SchedulerLoop;
pub use self::scheduler::Scheduler;
pub use self::status::{CycleReport, PendingTaskView, SchedulerStatus};
pub use self::task_store::{Admission, DueTasks, TaskStore};

//! Domain model (IDs, talks, task kinds, tasks, persisted state, errors).
//!
//! Everything here is pure data and pure functions; no I/O.

pub mod errors;
pub mod ids;
pub mod rooms;
pub mod state;
pub mod talk;
pub mod task;
pub mod task_kind;

pub use self::errors::{ErrorKind, Result, ScheduleError};
pub use self::ids::{AuditoriumId, RoomId, TalkId, UserId};
pub use self::rooms::{Message, Person, PersonRole, RoomRole};
pub use self::state::{ALL_AUDITORIUMS, DEFAULT_COMPLETED_CAP, SchedulerState};
pub use self::talk::Talk;
pub use self::task::{Task, TaskId, sort_tasks, start_time_of};
pub use self::task_kind::{Anchor, NARRATIVE_ORDER, TaskKind, UnknownTaskKind};

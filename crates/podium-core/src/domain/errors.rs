//! Errors - エラー型と分類

use thiserror::Error;

use super::rooms::RoomRole;

/// ErrorKind は実行エラーの分類
///
/// - Transient: 一時的なエラー（次のサイクルで解消しうる）
/// - Permanent: 恒久的なエラー（設定やデータの誤り）
/// - Infrastructure: インフラエラー（永続化やチャットサーバーの障害）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
    Infrastructure,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("schedule source failed: {0}")]
    Source(String),

    #[error("persistence failed for key={key}: {message}")]
    Persistence { key: String, message: String },

    #[error("state codec: {0}")]
    StateCodec(#[from] serde_json::Error),

    #[error("action failed: {0}")]
    Action(String),

    #[error("no {role} room for {subject}")]
    RoomNotFound { role: RoomRole, subject: String },

    #[error("check-in registry failed: {0}")]
    Checkin(String),

    #[error("people directory failed: {0}")]
    People(String),
}

impl ScheduleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScheduleError::Source(_) | ScheduleError::Action(_) => ErrorKind::Transient,
            ScheduleError::StateCodec(_) | ScheduleError::RoomNotFound { .. } => {
                ErrorKind::Permanent
            }
            ScheduleError::Persistence { .. }
            | ScheduleError::Checkin(_)
            | ScheduleError::People(_) => ErrorKind::Infrastructure,
        }
    }
}

pub type Result<T, E = ScheduleError> = std::result::Result<T, E>;

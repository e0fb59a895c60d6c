//! RecordingActionSink - 実行されたアクションを記録する（テスト・検証用）

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Message, Result, RoomId, ScheduleError};
use crate::ports::ActionSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedAction {
    Message { room: RoomId, message: Message },
    MadePublic { room: RoomId },
    VoteBoardReset { room: RoomId },
}

impl RecordedAction {
    pub fn room(&self) -> &RoomId {
        match self {
            RecordedAction::Message { room, .. }
            | RecordedAction::MadePublic { room }
            | RecordedAction::VoteBoardReset { room } => room,
        }
    }
}

#[derive(Default)]
pub struct RecordingActionSink {
    actions: Mutex<Vec<RecordedAction>>,
    failing_rooms: Mutex<HashSet<RoomId>>,
}

impl RecordingActionSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every action aimed at `room` fails from now on.
    pub async fn fail_room(&self, room: impl Into<RoomId>) {
        self.failing_rooms.lock().await.insert(room.into());
    }

    pub async fn actions(&self) -> Vec<RecordedAction> {
        self.actions.lock().await.clone()
    }

    pub async fn messages_in(&self, room: &RoomId) -> Vec<Message> {
        self.actions
            .lock()
            .await
            .iter()
            .filter_map(|action| match action {
                RecordedAction::Message { room: r, message } if r == room => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn clear(&self) {
        self.actions.lock().await.clear();
    }

    async fn record(&self, action: RecordedAction) -> Result<()> {
        if self.failing_rooms.lock().await.contains(action.room()) {
            return Err(ScheduleError::Action(format!("room {} unavailable", action.room())));
        }
        self.actions.lock().await.push(action);
        Ok(())
    }
}

#[async_trait]
impl ActionSink for RecordingActionSink {
    async fn send_message(&self, room: &RoomId, message: &Message) -> Result<()> {
        self.record(RecordedAction::Message {
            room: room.clone(),
            message: message.clone(),
        })
        .await
    }

    async fn make_room_public(&self, room: &RoomId) -> Result<()> {
        self.record(RecordedAction::MadePublic { room: room.clone() }).await
    }

    async fn reset_vote_board(&self, room: &RoomId) -> Result<()> {
        self.record(RecordedAction::VoteBoardReset { room: room.clone() }).await
    }
}

//! ActionSink port - チャットサーバーへの副作用
//!
//! Every call is best effort from the engine's point of view: a failure is
//! logged and reported but never retried.

use async_trait::async_trait;

use crate::domain::{Message, Result, RoomId};

#[async_trait]
pub trait ActionSink: Send + Sync {
    async fn send_message(&self, room: &RoomId, message: &Message) -> Result<()>;

    /// Flip the room's join rule and directory visibility to public.
    async fn make_room_public(&self, room: &RoomId) -> Result<()>;

    /// Clear the question/vote board attached to a room.
    async fn reset_vote_board(&self, room: &RoomId) -> Result<()>;
}

//! TracingActionSink - チャットサーバーの代わりにログへ書く ActionSink
//!
//! Lets the engine run end to end without a homeserver (dry runs, demos).

use async_trait::async_trait;
use tracing::info;

use crate::domain::{Message, Result, RoomId};
use crate::ports::ActionSink;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingActionSink;

#[async_trait]
impl ActionSink for TracingActionSink {
    async fn send_message(&self, room: &RoomId, message: &Message) -> Result<()> {
        info!(room = %room, markup = message.html.is_some(), "send: {}", message.text);
        Ok(())
    }

    async fn make_room_public(&self, room: &RoomId) -> Result<()> {
        info!(room = %room, "room made public");
        Ok(())
    }

    async fn reset_vote_board(&self, room: &RoomId) -> Result<()> {
        info!(room = %room, "vote board reset");
        Ok(())
    }
}

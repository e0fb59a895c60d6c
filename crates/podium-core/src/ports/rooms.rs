//! RoomDirectory port - トークやオーディトリアムに対応するルームの解決
//!
//! Room creation lives elsewhere; this only answers lookups.

use crate::domain::{AuditoriumId, RoomId, TalkId};

pub trait RoomDirectory: Send + Sync {
    fn talk_room(&self, talk: &TalkId) -> Option<RoomId>;

    fn auditorium_room(&self, auditorium: &AuditoriumId) -> Option<RoomId>;

    fn backstage_room(&self, auditorium: &AuditoriumId) -> Option<RoomId>;

    fn management_room(&self) -> RoomId;
}

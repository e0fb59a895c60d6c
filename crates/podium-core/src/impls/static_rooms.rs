//! StaticRoomDirectory - 設定ファイルから読むルーム対応表

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::{AuditoriumId, RoomId, TalkId};
use crate::ports::RoomDirectory;

#[derive(Debug, Clone, Deserialize)]
pub struct StaticRoomDirectory {
    pub management_room: RoomId,
    #[serde(default)]
    pub talk_rooms: HashMap<TalkId, RoomId>,
    #[serde(default)]
    pub auditorium_rooms: HashMap<AuditoriumId, RoomId>,
    #[serde(default)]
    pub backstage_rooms: HashMap<AuditoriumId, RoomId>,
}

impl StaticRoomDirectory {
    pub fn new(management_room: impl Into<RoomId>) -> Self {
        Self {
            management_room: management_room.into(),
            talk_rooms: HashMap::new(),
            auditorium_rooms: HashMap::new(),
            backstage_rooms: HashMap::new(),
        }
    }

    pub fn with_talk_room(mut self, talk: impl Into<TalkId>, room: impl Into<RoomId>) -> Self {
        self.talk_rooms.insert(talk.into(), room.into());
        self
    }

    pub fn with_auditorium(
        mut self,
        auditorium: impl Into<AuditoriumId>,
        room: impl Into<RoomId>,
        backstage: impl Into<RoomId>,
    ) -> Self {
        let auditorium = auditorium.into();
        self.auditorium_rooms.insert(auditorium.clone(), room.into());
        self.backstage_rooms.insert(auditorium, backstage.into());
        self
    }
}

impl RoomDirectory for StaticRoomDirectory {
    fn talk_room(&self, talk: &TalkId) -> Option<RoomId> {
        self.talk_rooms.get(talk).cloned()
    }

    fn auditorium_room(&self, auditorium: &AuditoriumId) -> Option<RoomId> {
        self.auditorium_rooms.get(auditorium).cloned()
    }

    fn backstage_room(&self, auditorium: &AuditoriumId) -> Option<RoomId> {
        self.backstage_rooms.get(auditorium).cloned()
    }

    fn management_room(&self) -> RoomId {
        self.management_room.clone()
    }
}

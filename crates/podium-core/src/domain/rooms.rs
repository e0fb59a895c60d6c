//! Rooms a talk's notifications can land in.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomRole {
    /// Per-talk room where speakers and hosts gather.
    Talk,
    /// Public room of the auditorium the talk is streamed in.
    Auditorium,
    /// Private staff room of the auditorium.
    Backstage,
    /// The engine's own management channel.
    Management,
}

impl fmt::Display for RoomRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomRole::Talk => "talk",
            RoomRole::Auditorium => "auditorium",
            RoomRole::Backstage => "backstage",
            RoomRole::Management => "management",
        };
        f.write_str(name)
    }
}

/// A message with an optional markup rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl Message {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: None,
        }
    }

    pub fn html(text: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: Some(html.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonRole {
    Speaker,
    Host,
    Coordinator,
}

/// Someone a talk needs present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub role: PersonRole,
    /// `None` when the person has no chat identity and cannot be mentioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Person {
    pub fn new(name: impl Into<String>, role: PersonRole, user_id: Option<UserId>) -> Self {
        Self {
            name: name.into(),
            role,
            user_id,
        }
    }
}

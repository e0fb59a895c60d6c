//! Domain identifiers (strongly-typed IDs).
//!
//! Talks, auditoriums, rooms and users are all identified by opaque strings
//! handed to us by the schedule source or the chat server. `Id<T>` wraps the
//! string and uses a phantom marker so a `TalkId` can never be passed where an
//! `AuditoriumId` is expected.
//!
//! ## Phantom Type パターン
//! `T` は実行時には使わない（PhantomData）マーカー型として、
//! コンパイル時の型安全性だけを提供します。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// Human readable name used in `Debug` output and error messages.
    fn label() -> &'static str;
}

/// ジェネリック ID 型
///
/// # 例
/// ```ignore
/// let talk: TalkId = Id::new("talk-42");
/// let aud: AuditoriumId = Id::new("main-stage");
/// // talk と aud は異なる型なので、混同できない
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", T::label(), self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TalkTag {}

impl IdMarker for TalkTag {
    fn label() -> &'static str {
        "TalkId"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AuditoriumTag {}

impl IdMarker for AuditoriumTag {
    fn label() -> &'static str {
        "AuditoriumId"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomTag {}

impl IdMarker for RoomTag {
    fn label() -> &'static str {
        "RoomId"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UserTag {}

impl IdMarker for UserTag {
    fn label() -> &'static str {
        "UserId"
    }
}

// ========================================
// Type Alias（使いやすさのため）
// ========================================

/// Identifier of a talk as reported by the schedule source.
pub type TalkId = Id<TalkTag>;

/// Identifier of an auditorium (venue hosting a sequence of talks).
pub type AuditoriumId = Id<AuditoriumTag>;

/// Identifier of a chat room.
pub type RoomId = Id<RoomTag>;

/// Mentionable chat identity of a person.
pub type UserId = Id<UserTag>;

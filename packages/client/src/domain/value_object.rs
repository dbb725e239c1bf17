//! Value objects: identifiers used across the domain.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Room ID is empty or whitespace only
    #[error("Room ID must not be empty")]
    EmptyRoomId,
}

/// Relay-assigned connection identifier.
///
/// Unique per connection, not per user: the same user reconnecting gets a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocketId(String);

impl SocketId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SocketId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of a collaboration room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Create a room id, rejecting blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyRoomId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Generate a fresh random room id (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_rejects_blank() {
        // テスト項目: 空白のみの Room ID は拒否される
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = RoomId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyRoomId));
    }

    #[test]
    fn test_room_id_is_trimmed() {
        // テスト項目: 前後の空白が取り除かれる
        // given (前提条件):
        let value = "  room-1 ";

        // when (操作):
        let room_id = RoomId::new(value).unwrap();

        // then (期待する結果):
        assert_eq!(room_id.as_str(), "room-1");
    }

    #[test]
    fn test_generated_room_ids_are_unique_uuids() {
        // テスト項目: 生成された Room ID は UUID 形式で毎回異なる
        // given (前提条件):

        // when (操作):
        let a = RoomId::generate();
        let b = RoomId::generate();

        // then (期待する結果):
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_socket_id_serializes_transparently() {
        // テスト項目: SocketId は JSON 上で素の文字列として扱われる
        // given (前提条件):
        let id = SocketId::new("abc123");

        // when (操作):
        let json = serde_json::to_string(&id).unwrap();

        // then (期待する結果):
        assert_eq!(json, "\"abc123\"");
    }
}

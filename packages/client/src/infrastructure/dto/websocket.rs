//! Relay event frames.
//!
//! Every frame is a JSON text message of the form `{"event": "<name>", "data": {...}}`
//! with camelCase payload fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire representation of an entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    File,
    Folder,
}

/// Events sent to the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String, username: String },

    #[serde(rename_all = "camelCase")]
    CodeChange {
        room_id: String,
        file_name: String,
        code: String,
        origin_id: String,
    },

    #[serde(rename_all = "camelCase")]
    FileCreated {
        room_id: String,
        file_name: String,
        #[serde(rename = "type")]
        kind: FileType,
    },

    #[serde(rename_all = "camelCase")]
    FileDeleted { room_id: String, file_name: String },

    #[serde(rename_all = "camelCase")]
    LineChange {
        room_id: String,
        line_number: i64,
        file_name: String,
        username: String,
    },

    #[serde(rename_all = "camelCase")]
    SendMessage {
        room_id: String,
        message: String,
        username: String,
    },

    #[serde(rename_all = "camelCase")]
    SendingSignal {
        user_to_signal: String,
        #[serde(rename = "callerID")]
        caller_id: String,
        signal: Value,
        username: String,
    },

    #[serde(rename_all = "camelCase")]
    ReturningSignal {
        signal: Value,
        #[serde(rename = "callerID")]
        caller_id: String,
    },

    #[serde(rename_all = "camelCase")]
    KickUser {
        room_id: String,
        target_socket_id: String,
    },

    #[serde(rename_all = "camelCase")]
    RunCode { language: String, code: String },
}

impl ClientEvent {
    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom { .. } => "join-room",
            ClientEvent::CodeChange { .. } => "code-change",
            ClientEvent::FileCreated { .. } => "file-created",
            ClientEvent::FileDeleted { .. } => "file-deleted",
            ClientEvent::LineChange { .. } => "line-change",
            ClientEvent::SendMessage { .. } => "send-message",
            ClientEvent::SendingSignal { .. } => "sending-signal",
            ClientEvent::ReturningSignal { .. } => "returning-signal",
            ClientEvent::KickUser { .. } => "kick-user",
            ClientEvent::RunCode { .. } => "run-code",
        }
    }
}

/// Participant entry in the `joined` snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireClient {
    pub socket_id: String,
    #[serde(default)]
    pub username: String,
}

/// File record as stored by the relay.
///
/// Older rooms keep the text under `content` instead of `value`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireFile {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: FileType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// The `joined` file set: either keyed by path or a plain list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireFiles {
    Map(BTreeMap<String, WireFile>),
    List(Vec<WireFile>),
}

/// `file-deleted` payload: a bare path or `{fileName}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeletedPath {
    Bare(String),
    #[serde(rename_all = "camelCase")]
    Named { file_name: String },
}

/// Events received from the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Handshake: the relay assigns this connection's socket id
    Connect { sid: String },

    /// Fatal connection failure
    #[serde(rename = "connect_error")]
    ConnectError,

    #[serde(rename_all = "camelCase")]
    Joined {
        #[serde(default)]
        clients: Vec<WireClient>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        files: Option<WireFiles>,
        #[serde(default)]
        host_id: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    UserJoined {
        socket_id: String,
        #[serde(default)]
        username: String,
    },

    #[serde(rename_all = "camelCase")]
    UserDisconnected {
        socket_id: String,
        #[serde(default)]
        username: String,
    },

    #[serde(rename_all = "camelCase")]
    CodeChange {
        file_name: String,
        code: String,
        #[serde(default)]
        origin_id: Option<String>,
    },

    FileCreated(WireFile),

    FileDeleted(DeletedPath),

    #[serde(rename_all = "camelCase")]
    LineChange {
        socket_id: String,
        line_number: i64,
        file_name: String,
        #[serde(default)]
        username: String,
    },

    #[serde(rename_all = "camelCase")]
    ReceiveMessage {
        message: String,
        #[serde(default)]
        username: String,
    },

    #[serde(rename_all = "camelCase")]
    UserJoinedCall {
        signal: Value,
        #[serde(rename = "callerID")]
        caller_id: String,
        #[serde(default)]
        username: String,
    },

    #[serde(rename_all = "camelCase")]
    ReceivingReturnedSignal { signal: Value, id: String },

    Kicked,

    #[serde(rename_all = "camelCase")]
    UpdateHost { host_id: String },

    #[serde(rename_all = "camelCase")]
    CodeOutput {
        output: String,
        #[serde(default)]
        is_error: bool,
    },
}

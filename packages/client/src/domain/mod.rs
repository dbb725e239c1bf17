//! Domain layer: room state and the passive components driven by the session.
//!
//! Nothing in here talks to the network. Each component only changes when
//! `RoomSession` calls into it.

pub mod activity;
pub mod chat;
pub mod editor;
pub mod file_tree;
pub mod host;
pub mod media;
pub mod peer_mesh;
pub mod presence;
pub mod preview;
pub mod room;
pub mod value_object;

pub use activity::{ActivityEntry, ActivityLog, ConsoleLine, ConsoleLog};
pub use chat::{ChatChannel, ChatMessage};
pub use editor::{
    DecorationId, EditorView, LineDecoration, Position, clamp_position, line_count, replace_line,
};
pub use file_tree::{FileTree, FileTreeNode, build_tree};
pub use host::{Confirmation, HostControl, KickError};
pub use media::{AudioCapture, LocalStream, MediaDevices, MediaError, NoMediaDevices};
pub use peer_mesh::{
    NullPeerConnector, PeerConnection, PeerConnector, PeerEvent, PeerEventKind, PeerEventSender,
    PeerEventSink, PeerMesh, PeerRole, Signal,
};
pub use presence::{LineMark, PresenceTracker, RemoteCursor};
pub use preview::render_preview;
pub use room::{ClientInfo, FileKind, FileMap, FileRecord, Room, language_for};
pub use value_object::{RoomId, SocketId, ValueObjectError};

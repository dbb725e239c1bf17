//! RoomSession: one client's view of one room.
//!
//! ## 責務
//!
//! - リレーから受信したイベントの適用（参加者・ファイル・プレゼンス・チャット・ホスト）
//! - ローカル操作の検証とリレーへの送信
//! - ボイス接続（PeerMesh）のシグナリング中継
//! - 終了時の後始末（メディア停止 → ピア破棄 → 送信側クローズ → 受信タスク停止）を一度だけ実行
//!
//! All state lives here and every handler is a `&mut self` method, so events are
//! applied one at a time in arrival order by whoever drives the session.

use std::collections::VecDeque;
use std::sync::Arc;

use collabix_shared::time::Clock;
use tokio::task::AbortHandle;

use super::command::Command;
use crate::{
    domain::{
        ActivityLog, ChatChannel, ChatMessage, ClientInfo, Confirmation, ConsoleLog, EditorView,
        FileKind, FileMap, FileRecord, FileTree, HostControl, LineMark, LocalStream,
        PeerConnector, PeerEvent, PeerEventKind, PeerEventSender, PeerMesh, PeerRole, Position,
        PresenceTracker, Room, RoomId, Signal, SocketId, build_tree, clamp_position, line_count,
        render_preview, replace_line,
    },
    error::ClientError,
    infrastructure::{
        dto::websocket::{ClientEvent, ServerEvent, WireClient, WireFiles},
        relay::RelaySender,
    },
};

/// Severity of a user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A transient message for the user (the terminal equivalent of a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Left,
    Kicked,
    ConnectionLost(Option<String>),
}

impl SessionEnd {
    /// Map the end reason to the caller-facing result.
    pub fn into_result(self, room_id: &RoomId) -> Result<(), ClientError> {
        match self {
            SessionEnd::Left => Ok(()),
            SessionEnd::Kicked => Err(ClientError::Kicked(room_id.to_string())),
            SessionEnd::ConnectionLost(reason) => Err(ClientError::ConnectionError(
                reason.unwrap_or_else(|| "connection lost".to_string()),
            )),
        }
    }
}

/// Result of running the open file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// HTML is rendered locally
    Preview(String),
    /// Sent to the relay's code runner; output arrives as `code-output`
    Submitted,
}

/// Everything a session is built from.
pub struct SessionParts {
    pub room_id: RoomId,
    pub username: String,
    /// Socket id assigned by the relay handshake
    pub local_id: SocketId,
    pub relay: RelaySender,
    pub listener: Option<AbortHandle>,
    pub editor: Box<dyn EditorView>,
    pub connector: Box<dyn PeerConnector>,
    pub peer_events: PeerEventSender,
    pub stream: Option<LocalStream>,
    pub clock: Arc<dyn Clock>,
}

pub struct RoomSession {
    username: String,
    room: Room,
    joined: bool,
    host: HostControl,
    presence: PresenceTracker,
    chat: ChatChannel,
    activity: ActivityLog,
    console: ConsoleLog,
    peers: PeerMesh,
    stream: Option<LocalStream>,
    editor: Box<dyn EditorView>,
    open_file: Option<String>,
    relay: RelaySender,
    listener: Option<AbortHandle>,
    clock: Arc<dyn Clock>,
    notices: VecDeque<Notice>,
    ended: Option<SessionEnd>,
    torn_down: bool,
}

impl RoomSession {
    pub fn new(parts: SessionParts) -> Self {
        let room = Room::from_snapshot(
            parts.room_id,
            parts.local_id,
            Vec::new(),
            Vec::<FileRecord>::new(),
        );
        Self {
            username: parts.username,
            room,
            joined: false,
            host: HostControl::new(),
            presence: PresenceTracker::new(),
            chat: ChatChannel::new(),
            activity: ActivityLog::new(),
            console: ConsoleLog::new(),
            peers: PeerMesh::new(parts.connector, parts.peer_events),
            stream: parts.stream,
            editor: parts.editor,
            open_file: None,
            relay: parts.relay,
            listener: parts.listener,
            clock: parts.clock,
            notices: VecDeque::new(),
            ended: None,
            torn_down: false,
        }
    }

    /// Announce ourselves to the room.
    pub fn start(&mut self) {
        tracing::info!("Joining room {} as {}", self.room.id, self.username);
        self.relay.emit(ClientEvent::JoinRoom {
            room_id: self.room.id.to_string(),
            username: self.username.clone(),
        });
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn room_id(&self) -> &RoomId {
        &self.room.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn local_id(&self) -> &SocketId {
        self.room.local_id()
    }

    /// Whether the `joined` snapshot has arrived
    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn host_id(&self) -> Option<&SocketId> {
        self.host.host_id()
    }

    pub fn is_host(&self) -> bool {
        self.host.is_host(self.room.local_id())
    }

    pub fn clients(&self) -> &[ClientInfo] {
        self.room.clients()
    }

    pub fn files(&self) -> &FileMap {
        self.room.files()
    }

    /// The file tree, rebuilt from the current file map.
    pub fn file_tree(&self) -> FileTree {
        build_tree(self.room.files())
    }

    pub fn open_file(&self) -> Option<&str> {
        self.open_file.as_deref()
    }

    pub fn editor(&self) -> &dyn EditorView {
        self.editor.as_ref()
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn chat(&self) -> &ChatChannel {
        &self.chat
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    pub fn peers(&self) -> &PeerMesh {
        &self.peers
    }

    pub fn has_voice(&self) -> bool {
        self.stream.is_some()
    }

    pub fn is_mic_on(&self) -> bool {
        self.stream.as_ref().is_some_and(LocalStream::is_enabled)
    }

    /// Preview document for the current files.
    pub fn preview(&self) -> String {
        render_preview(self.room.files(), self.open_file.as_deref())
    }

    pub fn session_end(&self) -> Option<&SessionEnd> {
        self.ended.as_ref()
    }

    pub fn is_ended(&self) -> bool {
        self.ended.is_some()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub(crate) fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Info => tracing::debug!("Notice: {}", message),
            NoticeLevel::Warning => tracing::warn!("{}", message),
            NoticeLevel::Error => tracing::error!("{}", message),
        }
        self.notices.push_back(Notice { level, message });
    }

    fn log_activity(&mut self, message: impl Into<String>) {
        let now = self.clock.now_millis();
        self.activity.record(message, now);
    }

    fn ensure_active(&self) -> Result<(), ClientError> {
        if self.ended.is_some() {
            return Err(ClientError::SessionClosed);
        }
        Ok(())
    }

    fn room_id_string(&self) -> String {
        self.room.id.to_string()
    }

    // ========================================
    // Local operations
    // ========================================

    /// Apply a command from the front-end. Display-only commands are no-ops here.
    ///
    /// Editor commands blur the chat; it stays open but new messages count as unread.
    pub fn execute(&mut self, command: Command) -> Result<(), ClientError> {
        if command.targets_editor() {
            self.chat.blur();
        }
        match command {
            Command::Open(path) => self.open(&path),
            Command::EditLine { line, text } => self.edit_line(line, &text),
            Command::MoveCursor(line) => self.move_cursor(line),
            Command::CreateFile { path, kind } => self.create_file(&path, kind),
            Command::DeleteFile(path) => self.delete_file(&path),
            Command::SetSharing(enabled) => self.set_sharing(enabled),
            Command::SendChat(text) => self.send_chat(&text).map(|_| ()),
            Command::FocusChat => {
                self.focus_chat();
                Ok(())
            }
            Command::HideChat => {
                self.hide_chat();
                Ok(())
            }
            Command::Kick {
                target,
                confirmation,
            } => {
                let target = self.resolve_participant(&target)?;
                self.kick(&target, confirmation)
            }
            Command::Run => self.run_active_file().map(|_| ()),
            Command::ToggleMic => {
                self.toggle_mic();
                Ok(())
            }
            Command::Show(_) => Ok(()),
            Command::Leave => {
                self.leave();
                Ok(())
            }
        }
    }

    /// Switch the editor to `path`.
    pub fn open(&mut self, path: &str) -> Result<(), ClientError> {
        self.ensure_active()?;
        match self.room.file(path) {
            Some(record) if !record.kind.is_folder() => {}
            _ => return Err(ClientError::UnknownFile(path.to_string())),
        }
        if self.open_file.as_deref() != Some(path) {
            self.show_file(path.to_string());
        }
        Ok(())
    }

    /// Local edit of a whole file: update the cache first, then broadcast.
    pub fn apply_local_edit(&mut self, file_name: &str, content: &str) -> Result<(), ClientError> {
        self.ensure_active()?;
        if !self.is_editable(file_name) {
            return Err(ClientError::UnknownFile(file_name.to_string()));
        }
        self.room.replace_content(file_name, content);
        self.relay.emit(ClientEvent::CodeChange {
            room_id: self.room_id_string(),
            file_name: file_name.to_string(),
            code: content.to_string(),
            origin_id: self.room.local_id().to_string(),
        });
        Ok(())
    }

    /// Replace one line of the open file in the editor and broadcast the result.
    pub fn edit_line(&mut self, line: u32, text: &str) -> Result<(), ClientError> {
        self.ensure_active()?;
        let file_name = self.open_file.clone().ok_or(ClientError::NoActiveFile)?;
        let content = replace_line(&self.editor.content(), line, text);
        self.editor.set_content(&content);
        self.apply_local_edit(&file_name, &content)?;
        self.move_cursor(line)
    }

    /// Move the local cursor and report it when sharing is on.
    pub fn move_cursor(&mut self, line: u32) -> Result<(), ClientError> {
        self.ensure_active()?;
        let file_name = self.open_file.clone().ok_or(ClientError::NoActiveFile)?;
        let column = self.editor.cursor().map_or(1, |position| position.column);
        let position = clamp_position(
            Position::new(line, column),
            line_count(&self.editor.content()),
        );
        self.editor.set_cursor(position);
        if let Some(mark) = self.presence.report_local_cursor(position.line) {
            self.emit_line(&file_name, mark);
        }
        Ok(())
    }

    /// Turn cursor sharing on or off.
    pub fn set_sharing(&mut self, enabled: bool) -> Result<(), ClientError> {
        self.ensure_active()?;
        if self.presence.is_sharing() == enabled {
            return Ok(());
        }
        let current_line = self.editor.cursor().map(|position| position.line);
        let mark = self.presence.set_sharing(enabled, current_line);
        if enabled {
            self.notify(NoticeLevel::Info, "Location sharing ON");
        } else {
            self.notify(NoticeLevel::Info, "Location sharing OFF");
        }
        // nothing to report without a known line or an open file
        if let (Some(mark), Some(file_name)) = (mark, self.open_file.clone()) {
            self.emit_line(&file_name, mark);
        }
        Ok(())
    }

    fn emit_line(&self, file_name: &str, mark: LineMark) {
        self.relay.emit(ClientEvent::LineChange {
            room_id: self.room_id_string(),
            line_number: mark.to_wire(),
            file_name: file_name.to_string(),
            username: self.username.clone(),
        });
    }

    /// Ask the relay to create a file or folder.
    ///
    /// The record only appears once the relay broadcasts it back.
    pub fn create_file(&mut self, path: &str, kind: FileKind) -> Result<(), ClientError> {
        self.ensure_active()?;
        let requested = path;
        let path = normalize_path(requested);
        if path.is_empty() {
            return Err(ClientError::InvalidPath(requested.to_string()));
        }
        if self.room.contains_file(&path) {
            self.notify(NoticeLevel::Error, format!("'{}' already exists", path));
            return Err(ClientError::FileExists(path));
        }
        self.relay.emit(ClientEvent::FileCreated {
            room_id: self.room_id_string(),
            file_name: path,
            kind: kind.into(),
        });
        Ok(())
    }

    /// Ask the relay to delete a path and everything below it.
    pub fn delete_file(&mut self, path: &str) -> Result<(), ClientError> {
        self.ensure_active()?;
        let path = normalize_path(path);
        let prefix = format!("{}/", path);
        let known = self
            .room
            .files()
            .keys()
            .any(|key| *key == path || key.starts_with(&prefix));
        if path.is_empty() || !known {
            return Err(ClientError::UnknownFile(path));
        }
        self.relay.emit(ClientEvent::FileDeleted {
            room_id: self.room_id_string(),
            file_name: path,
        });
        Ok(())
    }

    /// Send a chat message. Returns `false` for blank input, which is not sent.
    pub fn send_chat(&mut self, text: &str) -> Result<bool, ClientError> {
        self.ensure_active()?;
        let Some(message) = self.chat.prepare_send(text) else {
            return Ok(false);
        };
        self.relay.emit(ClientEvent::SendMessage {
            room_id: self.room_id_string(),
            message: message.to_string(),
            username: self.username.clone(),
        });
        Ok(true)
    }

    pub fn focus_chat(&mut self) {
        self.chat.focus();
    }

    pub fn hide_chat(&mut self) {
        self.chat.hide();
    }

    /// Find a participant by socket id, falling back to username.
    pub fn resolve_participant(&self, target: &str) -> Result<SocketId, ClientError> {
        let target_id = SocketId::new(target);
        if &target_id == self.room.local_id() || self.room.client(&target_id).is_some() {
            return Ok(target_id);
        }
        self.room
            .clients()
            .iter()
            .find(|client| client.username == target)
            .map(|client| client.socket_id.clone())
            .ok_or_else(|| ClientError::UnknownParticipant(target.to_string()))
    }

    /// Ask the relay to remove `target` from the room. Host only.
    pub fn kick(
        &mut self,
        target: &SocketId,
        confirmation: Confirmation,
    ) -> Result<(), ClientError> {
        self.ensure_active()?;
        if target != self.room.local_id() && self.room.client(target).is_none() {
            return Err(ClientError::UnknownParticipant(target.to_string()));
        }
        self.host
            .authorize_kick(self.room.local_id(), target, confirmation)?;
        tracing::info!("Removing {} from room {}", target, self.room.id);
        self.relay.emit(ClientEvent::KickUser {
            room_id: self.room_id_string(),
            target_socket_id: target.to_string(),
        });
        Ok(())
    }

    /// Run the open file: HTML previews locally, anything else goes to the relay.
    pub fn run_active_file(&mut self) -> Result<RunOutcome, ClientError> {
        self.ensure_active()?;
        let file_name = self.open_file.as_deref().ok_or(ClientError::NoActiveFile)?;
        let record = self
            .room
            .file(file_name)
            .ok_or_else(|| ClientError::UnknownFile(file_name.to_string()))?;

        if record.language == "html" {
            return Ok(RunOutcome::Preview(self.preview()));
        }

        let event = ClientEvent::RunCode {
            language: record.language.clone(),
            code: record.value.clone(),
        };
        self.console.start_run();
        self.relay.emit(event);
        Ok(RunOutcome::Submitted)
    }

    /// Flip the microphone. `None` when there is no local stream.
    pub fn toggle_mic(&mut self) -> Option<bool> {
        let enabled = self.stream.as_mut().map(LocalStream::toggle);
        match enabled {
            Some(true) => self.notify(NoticeLevel::Info, "Microphone on"),
            Some(false) => self.notify(NoticeLevel::Info, "Microphone muted"),
            None => self.notify(NoticeLevel::Warning, "Voice is not available"),
        }
        enabled
    }

    /// Leave the room voluntarily.
    pub fn leave(&mut self) {
        self.end(SessionEnd::Left);
    }

    // ========================================
    // Relay events
    // ========================================

    pub fn handle_server_event(&mut self, event: ServerEvent) {
        if self.torn_down {
            tracing::trace!("Ignoring event after teardown: {:?}", event);
            return;
        }
        match event {
            ServerEvent::Connect { sid } => {
                tracing::debug!("Ignoring repeated handshake ({})", sid);
            }
            ServerEvent::ConnectError => {
                self.notify(NoticeLevel::Error, "Socket connection failed");
                self.end(SessionEnd::ConnectionLost(Some(
                    "relay reported a connection error".to_string(),
                )));
            }
            ServerEvent::Joined {
                clients,
                files,
                host_id,
                ..
            } => self.on_joined(clients, files, host_id),
            ServerEvent::UserJoined {
                socket_id,
                username,
            } => self.on_user_joined(SocketId::new(socket_id), username),
            ServerEvent::UserDisconnected {
                socket_id,
                username,
            } => self.on_user_disconnected(SocketId::new(socket_id), username),
            ServerEvent::CodeChange {
                file_name,
                code,
                origin_id,
            } => self.on_remote_edit(&file_name, &code, origin_id.as_deref()),
            ServerEvent::FileCreated(file) => self.on_file_created(file.into()),
            ServerEvent::FileDeleted(path) => self.on_file_deleted(path.into()),
            ServerEvent::LineChange {
                socket_id,
                line_number,
                file_name,
                username,
            } => self.on_remote_line(SocketId::new(socket_id), line_number, &file_name, &username),
            ServerEvent::ReceiveMessage { message, username } => {
                self.chat.on_receive(ChatMessage { username, message });
            }
            ServerEvent::UserJoinedCall {
                signal,
                caller_id,
                username,
            } => self.on_incoming_call(SocketId::new(caller_id), &username, Signal(signal)),
            ServerEvent::ReceivingReturnedSignal { signal, id } => {
                self.peers
                    .accept_returned_signal(&SocketId::new(id), Signal(signal));
            }
            ServerEvent::Kicked => {
                self.notify(NoticeLevel::Error, "You have been removed.");
                self.end(SessionEnd::Kicked);
            }
            ServerEvent::UpdateHost { host_id } => self.on_update_host(SocketId::new(host_id)),
            ServerEvent::CodeOutput { output, is_error } => {
                self.console.push_output(output, is_error);
            }
        }
    }

    /// The relay listener reported the end of the connection.
    pub fn handle_relay_closed(&mut self, reason: Option<String>) {
        if self.ended.is_some() {
            return;
        }
        tracing::warn!(
            "Relay connection lost: {}",
            reason.as_deref().unwrap_or("closed")
        );
        self.end(SessionEnd::ConnectionLost(reason));
    }

    fn on_joined(
        &mut self,
        clients: Vec<WireClient>,
        files: Option<WireFiles>,
        host_id: Option<String>,
    ) {
        if self.joined {
            tracing::warn!("Ignoring duplicate 'joined' snapshot");
            return;
        }
        self.joined = true;

        let clients = clients.into_iter().map(ClientInfo::from).collect();
        let files = files.map(WireFiles::into_records).unwrap_or_default();
        self.room = Room::from_snapshot(
            self.room.id.clone(),
            self.room.local_id().clone(),
            clients,
            files,
        );
        if let Some(host_id) = host_id {
            self.host.update(SocketId::new(host_id));
        }
        tracing::info!(
            "Joined room {} ({} other participants, {} files)",
            self.room.id,
            self.room.clients().len(),
            self.room.files().len()
        );
        self.log_activity("You joined the room");

        if let Some(stream) = &self.stream {
            for client in self.room.clients() {
                self.peers
                    .create_peer(&client.socket_id, &client.username, stream);
            }
        }

        if let Some(first) = self.room.first_file().map(|record| record.name.clone()) {
            self.show_file(first);
        }
    }

    fn on_user_joined(&mut self, socket_id: SocketId, username: String) {
        if !self
            .room
            .add_client(ClientInfo::new(socket_id, username.clone()))
        {
            tracing::debug!("Ignoring 'user-joined' for a known participant");
            return;
        }
        self.notify(NoticeLevel::Info, format!("{} joined", username));
        self.log_activity(format!("{} joined", username));
    }

    fn on_user_disconnected(&mut self, socket_id: SocketId, username: String) {
        let removed = self.room.remove_client(&socket_id);
        self.presence
            .clear_participant(self.editor.as_mut(), &socket_id);
        self.peers.remove_peer(&socket_id);

        let username = removed.map(|client| client.username).unwrap_or(username);
        self.notify(NoticeLevel::Info, format!("{} left", username));
        self.log_activity(format!("{} left", username));
    }

    fn on_remote_edit(&mut self, file_name: &str, code: &str, origin_id: Option<&str>) {
        if origin_id == Some(self.room.local_id().as_str()) {
            tracing::trace!("Dropping echo of our own edit to {}", file_name);
            return;
        }
        if !self.is_editable(file_name) {
            tracing::debug!("Ignoring edit to unknown file {}", file_name);
            return;
        }
        self.room.replace_content(file_name, code);

        if self.open_file.as_deref() == Some(file_name) && self.editor.content() != code {
            let cursor = self.editor.cursor();
            self.editor.set_content(code);
            if let Some(position) = cursor {
                self.editor
                    .set_cursor(clamp_position(position, line_count(code)));
            }
        }
    }

    fn on_file_created(&mut self, mut record: FileRecord) {
        record.name = normalize_path(&record.name);
        if record.name.is_empty() {
            tracing::warn!("Ignoring 'file-created' without a path");
            return;
        }
        let name = record.name.clone();
        if !self.room.insert_file(record) {
            tracing::debug!("Ignoring 'file-created' for existing path {}", name);
            return;
        }
        self.log_activity(format!("File created: {}", name));
    }

    fn on_file_deleted(&mut self, path: String) {
        let removed = self.room.remove_path(&path);
        if removed.is_empty() {
            tracing::debug!("Ignoring 'file-deleted' for unknown path {}", path);
            return;
        }
        self.log_activity(format!("File deleted: {}", path));

        let open_removed = self
            .open_file
            .as_ref()
            .is_some_and(|open| removed.contains(open));
        if open_removed {
            self.presence.clear_all(self.editor.as_mut());
            self.open_file = None;
            self.editor.set_content("");
        }
    }

    fn on_remote_line(
        &mut self,
        socket_id: SocketId,
        line_number: i64,
        file_name: &str,
        username: &str,
    ) {
        if &socket_id == self.room.local_id() {
            return;
        }
        let Some(mark) = LineMark::from_wire(line_number) else {
            tracing::warn!("Ignoring invalid line number {} from {}", line_number, socket_id);
            return;
        };
        self.presence.on_remote_cursor(
            self.editor.as_mut(),
            self.open_file.as_deref(),
            &socket_id,
            file_name,
            mark,
            username,
        );
    }

    fn on_incoming_call(&mut self, caller_id: SocketId, username: &str, signal: Signal) {
        let Some(stream) = &self.stream else {
            tracing::debug!("No local audio; ignoring call from {}", caller_id);
            return;
        };
        self.peers.add_peer(&caller_id, username, signal, stream);
    }

    fn on_update_host(&mut self, host_id: SocketId) {
        if self.host.update(host_id) && self.is_host() {
            self.notify(NoticeLevel::Info, "You are now the host");
        }
    }

    // ========================================
    // Peer events
    // ========================================

    /// Route a signal or status report from a local voice connection.
    ///
    /// Events from a connection that has since been replaced or removed are dropped.
    pub fn handle_peer_event(&mut self, event: PeerEvent) {
        if self.torn_down {
            return;
        }
        let PeerEvent {
            peer_id,
            generation,
            kind,
        } = event;
        let Some(role) = self.peers.live_role(&peer_id, generation) else {
            tracing::debug!(
                "Dropping event from stale connection to {} (generation {})",
                peer_id,
                generation
            );
            return;
        };
        match kind {
            PeerEventKind::Signal(signal) => match role {
                PeerRole::Initiator => {
                    self.relay.emit(ClientEvent::SendingSignal {
                        user_to_signal: peer_id.into_string(),
                        caller_id: self.room.local_id().to_string(),
                        signal: signal.into(),
                        username: self.username.clone(),
                    });
                }
                PeerRole::Responder => {
                    self.relay.emit(ClientEvent::ReturningSignal {
                        signal: signal.into(),
                        caller_id: peer_id.into_string(),
                    });
                }
            },
            PeerEventKind::Stream => {
                tracing::info!("Receiving audio from {}", peer_id);
            }
            PeerEventKind::Error(message) => {
                tracing::warn!("Voice connection to {} failed: {}", peer_id, message);
                self.peers.remove_connection(&peer_id, generation);
            }
            PeerEventKind::Closed => {
                self.peers.remove_connection(&peer_id, generation);
            }
        }
    }

    // ========================================
    // Internals
    // ========================================

    fn is_editable(&self, file_name: &str) -> bool {
        self.room
            .file(file_name)
            .is_some_and(|record| !record.kind.is_folder())
    }

    fn show_file(&mut self, path: String) {
        self.presence.clear_all(self.editor.as_mut());
        let content = self
            .room
            .file(&path)
            .map(|record| record.value.clone())
            .unwrap_or_default();
        self.editor.set_content(&content);
        self.editor.set_cursor(Position::new(1, 1));
        self.open_file = Some(path);
    }

    fn end(&mut self, reason: SessionEnd) {
        if self.ended.is_none() {
            tracing::info!("Session ended: {:?}", reason);
            self.ended = Some(reason);
        }
        self.teardown();
    }

    /// Release every resource exactly once.
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if let Some(stream) = self.stream.as_mut() {
            stream.stop();
        }
        self.peers.destroy_all();
        self.relay.close();
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        tracing::debug!("Session resources released");
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Trim whitespace and surrounding separators from a user-supplied path.
fn normalize_path(path: &str) -> String {
    path.trim().trim_matches('/').to_string()
}

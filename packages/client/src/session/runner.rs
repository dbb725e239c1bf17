//! Connecting a session and driving it.
//!
//! ```text
//!  relay listener ──RelayInbound──┐
//!  peer connections ──PeerEvent───┼──▶ select! ──▶ RoomSession handler ──▶ observer
//!  front-end ──Command────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use collabix_shared::time::Clock;
use tokio::sync::mpsc;

use super::command::{Command, View};
use super::room_session::{NoticeLevel, RoomSession, RunOutcome, SessionParts};
use crate::{
    domain::{EditorView, LocalStream, MediaDevices, PeerConnector, PeerEvent, RoomId},
    error::ClientError,
    infrastructure::relay::{self, RelayInbound},
};

/// Default time allowed for the relay's `connect` handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and as whom to join
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub relay_url: String,
    pub room_id: RoomId,
    pub username: String,
    pub handshake_timeout: Duration,
}

impl SessionConfig {
    pub fn new(relay_url: impl Into<String>, room_id: RoomId, username: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            room_id,
            username: username.into(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

/// Front-end specific collaborators
pub struct SessionDeps {
    pub editor: Box<dyn EditorView>,
    pub media: Arc<dyn MediaDevices>,
    pub connector: Box<dyn PeerConnector>,
    pub clock: Arc<dyn Clock>,
}

/// Receives the session after every handled event so the front-end can redraw.
pub trait SessionObserver {
    /// Called after each event or command; drain notices here.
    fn on_update(&mut self, session: &mut RoomSession);

    /// Render a read-only view on request.
    fn show(&mut self, view: View, session: &RoomSession);

    /// Present a locally rendered HTML preview.
    fn show_preview(&mut self, document: &str);
}

/// Connect to the relay, acquire audio and announce ourselves.
///
/// Audio acquisition and the relay handshake run concurrently. Failing to get audio is
/// not fatal; failing to reach the relay is, and any acquired audio is released.
pub async fn connect(
    config: SessionConfig,
    deps: SessionDeps,
) -> Result<ConnectedSession, ClientError> {
    let (media, connection) = tokio::join!(
        deps.media.acquire_audio(),
        relay::connect(&config.relay_url, config.handshake_timeout)
    );

    let mut media_error = None;
    let mut stream = match media {
        Ok(capture) => Some(LocalStream::new(capture)),
        Err(e) => {
            media_error = Some(e);
            None
        }
    };

    let connection = match connection {
        Ok(connection) => connection,
        Err(e) => {
            if let Some(stream) = stream.as_mut() {
                stream.stop();
            }
            return Err(e);
        }
    };

    let (peer_tx, peer_events) = mpsc::unbounded_channel();
    let mut session = RoomSession::new(SessionParts {
        room_id: config.room_id,
        username: config.username,
        local_id: connection.local_id,
        relay: connection.sender,
        listener: Some(connection.listener),
        editor: deps.editor,
        connector: deps.connector,
        peer_events: peer_tx,
        stream,
        clock: deps.clock,
    });
    if let Some(e) = media_error {
        session.notify(NoticeLevel::Warning, format!("Voice disabled: {}", e));
    }
    session.start();

    Ok(ConnectedSession {
        session,
        inbound: connection.inbound,
        peer_events,
    })
}

/// A joined session together with its event sources
pub struct ConnectedSession {
    session: RoomSession,
    inbound: mpsc::UnboundedReceiver<RelayInbound>,
    peer_events: mpsc::UnboundedReceiver<PeerEvent>,
}

impl ConnectedSession {
    pub fn session(&self) -> &RoomSession {
        &self.session
    }

    /// Handle events until the session ends.
    ///
    /// Closing the command channel counts as leaving the room.
    pub async fn run<O: SessionObserver>(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        observer: &mut O,
    ) -> Result<(), ClientError> {
        observer.on_update(&mut self.session);

        loop {
            tokio::select! {
                inbound = self.inbound.recv() => match inbound {
                    Some(RelayInbound::Event(event)) => self.session.handle_server_event(event),
                    Some(RelayInbound::Closed(reason)) => self.session.handle_relay_closed(reason),
                    None => self.session.handle_relay_closed(None),
                },
                Some(event) = self.peer_events.recv() => self.session.handle_peer_event(event),
                command = commands.recv() => match command {
                    Some(command) => {
                        if let Err(e) = self.dispatch(command, observer) {
                            self.session.notify(NoticeLevel::Error, e.to_string());
                        }
                    }
                    None => self.session.leave(),
                },
            }

            observer.on_update(&mut self.session);

            if let Some(end) = self.session.session_end().cloned() {
                return end.into_result(self.session.room_id());
            }
        }
    }

    fn dispatch<O: SessionObserver>(
        &mut self,
        command: Command,
        observer: &mut O,
    ) -> Result<(), ClientError> {
        match command {
            Command::Show(view) => {
                observer.show(view, &self.session);
                Ok(())
            }
            Command::Run => {
                if let RunOutcome::Preview(document) = self.session.run_active_file()? {
                    observer.show_preview(&document);
                }
                Ok(())
            }
            other => self.session.execute(other),
        }
    }
}

//! Voice peer mesh: one connection per remote participant.
//!
//! The relay is used purely as a signaling channel. Connections report their own
//! signals and streams back to the session through a `PeerEvent` channel, which the
//! session loop drains like any other event source.
//!
//! ```text
//! newcomer N                    relay                    existing A
//! joined {clients:[A]}
//! create_peer(A, Initiator) ─ sending-signal ──▶ user-joined-call
//!                                                add_peer(N, Responder)
//! receiving-returned-signal ◀── returning-signal ─┘
//! accept_returned_signal(A)
//! ```

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::media::LocalStream;
use super::value_object::SocketId;

/// Opaque WebRTC signaling payload (offer, answer or candidate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signal(pub serde_json::Value);

/// Which side of the handshake a connection plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    /// Creates the offer
    Initiator,
    /// Answers an inbound offer
    Responder,
}

/// What a peer connection reported
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEventKind {
    /// A local signal is ready to be relayed to the remote side
    Signal(Signal),
    /// Remote audio started playing
    Stream,
    /// The connection failed
    Error(String),
    /// The connection closed by itself
    Closed,
}

/// An event from one connection instance.
///
/// Replacing the connection to a peer bumps the generation, so anything still queued
/// from the old instance can be told apart from the live one.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerEvent {
    pub peer_id: SocketId,
    pub generation: u64,
    pub kind: PeerEventKind,
}

pub type PeerEventSender = mpsc::UnboundedSender<PeerEvent>;

/// Event channel handed to a single connection. Every event it sends is stamped with
/// the connection's peer id and generation.
#[derive(Debug, Clone)]
pub struct PeerEventSink {
    peer_id: SocketId,
    generation: u64,
    tx: PeerEventSender,
}

impl PeerEventSink {
    pub fn new(peer_id: SocketId, generation: u64, tx: PeerEventSender) -> Self {
        Self {
            peer_id,
            generation,
            tx,
        }
    }

    pub fn peer_id(&self) -> &SocketId {
        &self.peer_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `false` once the session stopped listening.
    pub fn send(&self, kind: PeerEventKind) -> bool {
        self.tx
            .send(PeerEvent {
                peer_id: self.peer_id.clone(),
                generation: self.generation,
                kind,
            })
            .is_ok()
    }
}

/// A single voice connection handle.
pub trait PeerConnection: Send {
    /// Apply a remote signal
    fn signal(&mut self, signal: Signal);

    /// Close the connection and stop its audio output
    fn destroy(&mut self);
}

/// Factory for voice connections (the WebRTC backend).
pub trait PeerConnector: Send {
    /// Open a connection to `peer_id`, attaching the borrowed local stream.
    ///
    /// The connection reports its signals and status through `events`.
    fn connect(
        &mut self,
        peer_id: &SocketId,
        role: PeerRole,
        stream: &LocalStream,
        events: PeerEventSink,
    ) -> Box<dyn PeerConnection>;
}

/// Connector for front-ends without a WebRTC backend.
///
/// Connections never produce signals, so no handshake traffic is generated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPeerConnector;

struct NullPeerConnection;

impl PeerConnection for NullPeerConnection {
    fn signal(&mut self, _signal: Signal) {}

    fn destroy(&mut self) {}
}

impl PeerConnector for NullPeerConnector {
    fn connect(
        &mut self,
        _peer_id: &SocketId,
        _role: PeerRole,
        _stream: &LocalStream,
        _events: PeerEventSink,
    ) -> Box<dyn PeerConnection> {
        Box::new(NullPeerConnection)
    }
}

struct PeerEntry {
    username: String,
    role: PeerRole,
    generation: u64,
    connection: Box<dyn PeerConnection>,
    /// Initiators accept exactly one returned signal
    answered: bool,
}

/// The set of live voice connections, keyed by remote socket id.
pub struct PeerMesh {
    connector: Box<dyn PeerConnector>,
    events: PeerEventSender,
    peers: HashMap<SocketId, PeerEntry>,
    next_generation: u64,
}

impl PeerMesh {
    pub fn new(connector: Box<dyn PeerConnector>, events: PeerEventSender) -> Self {
        Self {
            connector,
            events,
            peers: HashMap::new(),
            next_generation: 0,
        }
    }

    /// Open an initiator connection to a participant that was present when we joined.
    pub fn create_peer(&mut self, peer_id: &SocketId, username: &str, stream: &LocalStream) {
        self.insert(peer_id, username, PeerRole::Initiator, stream);
        tracing::debug!("Created initiator peer for '{}'", peer_id);
    }

    /// Answer a newcomer's offer: open a responder connection and apply the offer at once.
    pub fn add_peer(
        &mut self,
        caller_id: &SocketId,
        username: &str,
        incoming: Signal,
        stream: &LocalStream,
    ) {
        let entry = self.insert(caller_id, username, PeerRole::Responder, stream);
        entry.connection.signal(incoming);
        tracing::debug!("Added responder peer for '{}'", caller_id);
    }

    /// Apply the answer returned to one of our initiator connections.
    ///
    /// Unknown ids, responders and repeated answers are ignored (returns `false`).
    pub fn accept_returned_signal(&mut self, peer_id: &SocketId, signal: Signal) -> bool {
        match self.peers.get_mut(peer_id) {
            Some(entry) if entry.role == PeerRole::Initiator && !entry.answered => {
                entry.answered = true;
                entry.connection.signal(signal);
                true
            }
            Some(_) => {
                tracing::debug!("Ignoring repeated returned signal from '{}'", peer_id);
                false
            }
            None => {
                tracing::debug!("Ignoring returned signal for unknown peer '{}'", peer_id);
                false
            }
        }
    }

    /// Destroy and forget the connection to `peer_id`.
    pub fn remove_peer(&mut self, peer_id: &SocketId) -> bool {
        match self.peers.remove(peer_id) {
            Some(mut entry) => {
                entry.connection.destroy();
                tracing::debug!("Destroyed peer '{}' ({})", peer_id, entry.username);
                true
            }
            None => false,
        }
    }

    /// Remove the connection to `peer_id` only if it is still the given instance.
    pub fn remove_connection(&mut self, peer_id: &SocketId, generation: u64) -> bool {
        if self.generation_of(peer_id) != Some(generation) {
            return false;
        }
        self.remove_peer(peer_id)
    }

    /// Destroy every connection.
    pub fn destroy_all(&mut self) {
        for (peer_id, mut entry) in self.peers.drain() {
            entry.connection.destroy();
            tracing::debug!("Destroyed peer '{}'", peer_id);
        }
    }

    pub fn role_of(&self, peer_id: &SocketId) -> Option<PeerRole> {
        self.peers.get(peer_id).map(|entry| entry.role)
    }

    /// Role of the live connection to `peer_id`, or `None` when `generation` is stale.
    pub fn live_role(&self, peer_id: &SocketId, generation: u64) -> Option<PeerRole> {
        self.peers
            .get(peer_id)
            .filter(|entry| entry.generation == generation)
            .map(|entry| entry.role)
    }

    pub fn generation_of(&self, peer_id: &SocketId) -> Option<u64> {
        self.peers.get(peer_id).map(|entry| entry.generation)
    }

    pub fn username_of(&self, peer_id: &SocketId) -> Option<&str> {
        self.peers.get(peer_id).map(|entry| entry.username.as_str())
    }

    pub fn contains(&self, peer_id: &SocketId) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn peer_ids(&self) -> BTreeSet<SocketId> {
        self.peers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    fn insert(
        &mut self,
        peer_id: &SocketId,
        username: &str,
        role: PeerRole,
        stream: &LocalStream,
    ) -> &mut PeerEntry {
        // at most one connection per peer id
        self.remove_peer(peer_id);

        self.next_generation += 1;
        let generation = self.next_generation;
        let sink = PeerEventSink::new(peer_id.clone(), generation, self.events.clone());
        let connection = self.connector.connect(peer_id, role, stream, sink);
        self.peers
            .entry(peer_id.clone())
            .insert_entry(PeerEntry {
                username: username.to_string(),
                role,
                generation,
                connection,
                answered: false,
            })
            .into_mut()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Recording connector shared by the domain and session tests.

    use std::sync::{Arc, Mutex};

    use super::*;

    /// What happened to the fake connections, in order.
    #[derive(Debug, Clone, PartialEq)]
    pub enum PeerLog {
        Connected(SocketId, PeerRole),
        Signaled(SocketId, Signal),
        Destroyed(SocketId),
    }

    pub type SharedLog = Arc<Mutex<Vec<PeerLog>>>;

    /// Connector whose connections emit one local signal as soon as they are created.
    pub struct RecordingConnector {
        pub log: SharedLog,
        /// Connections report `Closed` when destroyed, like a real backend does
        pub close_on_destroy: bool,
    }

    struct RecordingConnection {
        events: PeerEventSink,
        log: SharedLog,
        close_on_destroy: bool,
    }

    impl PeerConnection for RecordingConnection {
        fn signal(&mut self, signal: Signal) {
            self.log
                .lock()
                .unwrap()
                .push(PeerLog::Signaled(self.events.peer_id().clone(), signal));
        }

        fn destroy(&mut self) {
            self.log
                .lock()
                .unwrap()
                .push(PeerLog::Destroyed(self.events.peer_id().clone()));
            if self.close_on_destroy {
                self.events.send(PeerEventKind::Closed);
            }
        }
    }

    impl PeerConnector for RecordingConnector {
        fn connect(
            &mut self,
            peer_id: &SocketId,
            role: PeerRole,
            _stream: &LocalStream,
            events: PeerEventSink,
        ) -> Box<dyn PeerConnection> {
            self.log
                .lock()
                .unwrap()
                .push(PeerLog::Connected(peer_id.clone(), role));
            let kind = match role {
                PeerRole::Initiator => "offer",
                PeerRole::Responder => "answer",
            };
            events.send(PeerEventKind::Signal(Signal(serde_json::json!({ "type": kind }))));
            Box::new(RecordingConnection {
                events,
                log: self.log.clone(),
                close_on_destroy: self.close_on_destroy,
            })
        }
    }

    pub fn recording_connector() -> (RecordingConnector, SharedLog) {
        let log: SharedLog = Arc::new(Mutex::new(Vec::new()));
        let connector = RecordingConnector {
            log: log.clone(),
            close_on_destroy: false,
        };
        (connector, log)
    }

    /// Like [`recording_connector`], but destroyed connections report `Closed`.
    pub fn closing_connector() -> (RecordingConnector, SharedLog) {
        let (mut connector, log) = recording_connector();
        connector.close_on_destroy = true;
        (connector, log)
    }

    pub fn silent_stream() -> LocalStream {
        struct Silent;
        impl crate::domain::media::AudioCapture for Silent {
            fn track_id(&self) -> String {
                "silent".to_string()
            }
            fn set_enabled(&mut self, _enabled: bool) {}
            fn stop(&mut self) {}
        }
        LocalStream::new(Box::new(Silent))
    }
}

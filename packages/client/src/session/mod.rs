//! The room session: the single owner of all client-side room state.

pub mod command;
pub mod room_session;
pub mod runner;

pub use command::{Command, View};
pub use room_session::{Notice, NoticeLevel, RoomSession, RunOutcome, SessionEnd, SessionParts};
pub use runner::{
    ConnectedSession, DEFAULT_HANDSHAKE_TIMEOUT, SessionConfig, SessionDeps, SessionObserver,
    connect,
};

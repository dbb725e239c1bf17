//! Real-time synchronization core of the Collabix collaborative code editor.
//!
//! The crate keeps a shared workspace (file tree, file contents, cursor presence,
//! chat, voice mesh) consistent across everyone connected to the same room.
//! All ordering comes from the relay; conflicting edits resolve by last arrival.

// layers
pub mod domain;
pub mod infrastructure;
pub mod session;

// terminal front-end
pub mod client;

pub mod error;

pub use error::ClientError;

//! Error types for the Collabix client.

use thiserror::Error;

use crate::domain::{KickError, ValueObjectError};

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay could not be reached or reported a fatal connection failure
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The host removed this client from the room
    #[error("Removed from room '{0}' by the host")]
    Kicked(String),

    /// A file or folder with this path already exists
    #[error("'{0}' already exists")]
    FileExists(String),

    /// The path is blank once surrounding separators are removed
    #[error("Invalid path: '{0}'")]
    InvalidPath(String),

    #[error("No such file: '{0}'")]
    UnknownFile(String),

    /// An operation that needs an open file was issued with none open
    #[error("No file is open")]
    NoActiveFile,

    #[error("No such participant: '{0}'")]
    UnknownParticipant(String),

    #[error(transparent)]
    Kick(#[from] KickError),

    /// The room session already ended
    #[error("The session has ended")]
    SessionClosed,

    /// The auth API refused the credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed: {0}")]
    Download(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidValue(#[from] ValueObjectError),
}

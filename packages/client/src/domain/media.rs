//! Local audio capture.
//!
//! The session owns the single `LocalStream` and lends it to the peer connector
//! whenever a voice connection is created. Muting only flips the local flag.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Audio acquisition errors (never fatal for a session)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// No capture device or backend
    #[error("Audio capture unavailable: {0}")]
    Unavailable(String),

    /// The user or platform refused microphone access
    #[error("Microphone permission denied")]
    PermissionDenied,
}

/// A live microphone track.
#[cfg_attr(test, automock)]
pub trait AudioCapture: Send {
    /// Identifier the peer connector uses to attach the track
    fn track_id(&self) -> String;

    fn set_enabled(&mut self, enabled: bool);

    /// Release the device. Called once during teardown.
    fn stop(&mut self);
}

/// Source of local audio.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn acquire_audio(&self) -> Result<Box<dyn AudioCapture>, MediaError>;
}

/// The session-owned local stream.
pub struct LocalStream {
    capture: Box<dyn AudioCapture>,
    enabled: bool,
    stopped: bool,
}

impl std::fmt::Debug for LocalStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStream")
            .field("track_id", &self.capture.track_id())
            .field("enabled", &self.enabled)
            .field("stopped", &self.stopped)
            .finish()
    }
}

impl LocalStream {
    pub fn new(capture: Box<dyn AudioCapture>) -> Self {
        Self {
            capture,
            enabled: true,
            stopped: false,
        }
    }

    pub fn track_id(&self) -> String {
        self.capture.track_id()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Flip the mic on/off and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.capture.set_enabled(self.enabled);
        self.enabled
    }

    /// Stop capturing. Later calls are no-ops.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.capture.stop();
    }
}

/// Media backend for front-ends without audio support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMediaDevices;

#[async_trait]
impl MediaDevices for NoMediaDevices {
    async fn acquire_audio(&self) -> Result<Box<dyn AudioCapture>, MediaError> {
        Err(MediaError::Unavailable(
            "this front-end has no audio backend".to_string(),
        ))
    }
}

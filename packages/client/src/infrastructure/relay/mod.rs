//! リレーサーバーとの接続
//!
//! ## 責務
//!
//! - 送信イベントのキューイング（`RelaySender`）
//! - 受信イベントと切断通知の受け渡し（`RelayInbound`）
//!
//! WebSocket の生成と読み書きタスクは `websocket` モジュールが担当します。

pub mod websocket;

use tokio::sync::mpsc;

use crate::infrastructure::dto::websocket::{ClientEvent, ServerEvent};

pub use websocket::{RelayConnection, connect};

/// What the listener task hands to the session
#[derive(Debug, Clone, PartialEq)]
pub enum RelayInbound {
    Event(ServerEvent),
    /// The relay connection ended, with a reason when one is known
    Closed(Option<String>),
}

/// Outbound half of the relay connection.
///
/// Closing drops the queue; the writer task then flushes a close frame and exits.
#[derive(Debug)]
pub struct RelaySender {
    tx: Option<mpsc::UnboundedSender<ClientEvent>>,
}

impl RelaySender {
    pub fn new(tx: mpsc::UnboundedSender<ClientEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sender wired to an in-memory queue instead of a socket.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Queue an event. Returns `false` when the connection is already closed.
    pub fn emit(&self, event: ClientEvent) -> bool {
        let Some(tx) = &self.tx else {
            tracing::debug!("Dropping '{}': relay sender closed", event.name());
            return false;
        };
        let name = event.name();
        if tx.send(event).is_err() {
            tracing::warn!("Dropping '{}': relay writer has stopped", name);
            return false;
        }
        tracing::trace!("Queued '{}'", name);
        true
    }

    pub fn close(&mut self) {
        self.tx.take();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().is_none_or(|tx| tx.is_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_code() -> ClientEvent {
        ClientEvent::RunCode {
            language: "python".to_string(),
            code: "print(1)".to_string(),
        }
    }

    #[test]
    fn test_emit_queues_event() {
        // テスト項目: emit したイベントがキューに積まれる
        // given (前提条件):
        let (sender, mut rx) = RelaySender::channel();

        // when (操作):
        let sent = sender.emit(run_code());

        // then (期待する結果):
        assert!(sent);
        assert_eq!(rx.try_recv().unwrap(), run_code());
    }

    #[test]
    fn test_emit_after_close_is_dropped() {
        // テスト項目: close 後の emit は送信されず false を返す
        // given (前提条件):
        let (mut sender, mut rx) = RelaySender::channel();

        // when (操作):
        sender.close();
        let sent = sender.emit(run_code());

        // then (期待する結果):
        assert!(!sent);
        assert!(sender.is_closed());
        assert!(rx.try_recv().is_err());
    }
}

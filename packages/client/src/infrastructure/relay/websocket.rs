//! WebSocket transport for the relay.
//!
//! `connect` performs the handshake (waits for the relay's `connect` event carrying
//! this connection's socket id) and then splits the stream into a writer task fed by
//! `RelaySender` and a listener task that forwards parsed events.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::AbortHandle};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use super::{RelayInbound, RelaySender};
use crate::{
    domain::SocketId,
    error::ClientError,
    infrastructure::dto::websocket::{ClientEvent, ServerEvent},
};

/// An established relay connection
#[derive(Debug)]
pub struct RelayConnection {
    /// Socket id the relay assigned in the handshake
    pub local_id: SocketId,
    pub sender: RelaySender,
    pub inbound: mpsc::UnboundedReceiver<RelayInbound>,
    /// Stops the listener task
    pub listener: AbortHandle,
}

/// Connect to the relay and complete the handshake.
pub async fn connect(
    url: &str,
    handshake_timeout: Duration,
) -> Result<RelayConnection, ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    tracing::info!("Connected to relay at {}", url);

    let (mut write, mut read) = ws_stream.split();

    let local_id = tokio::time::timeout(handshake_timeout, async {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(ServerEvent::Connect { sid }) => return Ok(SocketId::new(sid)),
                    Ok(ServerEvent::ConnectError) => {
                        return Err(ClientError::ConnectionError(
                            "relay rejected the connection".to_string(),
                        ));
                    }
                    Ok(other) => tracing::debug!("Ignoring event before handshake: {:?}", other),
                    Err(e) => tracing::warn!("Malformed frame during handshake: {}", e),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
            }
        }
        Err(ClientError::ConnectionError(
            "relay closed the connection during handshake".to_string(),
        ))
    })
    .await
    .map_err(|_| ClientError::ConnectionError("relay handshake timed out".to_string()))??;
    tracing::debug!("Relay assigned socket id {}", local_id);

    // Writer: drains the outbound queue until the sender is closed
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientEvent>();
    tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize '{}': {}", event.name(), e);
                    continue;
                }
            };
            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send '{}': {}", event.name(), e);
                break;
            }
        }
        let _ = write.send(Message::Close(None)).await;
        tracing::debug!("Relay writer stopped");
    });

    // Listener: forwards parsed events until the connection ends
    let (in_tx, inbound) = mpsc::unbounded_channel::<RelayInbound>();
    let listener = tokio::spawn(async move {
        let reason = loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => {
                        if in_tx.send(RelayInbound::Event(event)).is_err() {
                            return;
                        }
                    }
                    Err(e) => tracing::warn!("Ignoring unrecognized relay frame: {}", e),
                },
                Some(Ok(Message::Close(frame))) => {
                    break frame
                        .map(|f| f.reason.as_str().to_string())
                        .filter(|reason| !reason.is_empty());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Some(e.to_string()),
                None => break None,
            }
        };
        tracing::info!("Relay connection closed");
        let _ = in_tx.send(RelayInbound::Closed(reason));
    })
    .abort_handle();

    Ok(RelayConnection {
        local_id,
        sender: RelaySender::new(out_tx),
        inbound,
        listener,
    })
}

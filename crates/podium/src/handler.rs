//! Per-connection handler: decode, validate, forward, and write back.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register with the coordinator, handing over an outbound channel
//!   2. Loop, whichever comes first:
//!      - a frame from the socket → decode + validate → coordinator
//!      - a notification from the coordinator → envelope → socket
//!   3. On close or error, the guard tells the coordinator to disconnect

use std::sync::Arc;

use podium_protocol::{
    ClientEnvelope, ClientEvent, Codec, ConnectionId, Envelope,
    ProtocolError, ServerEvent,
};
use podium_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::PodiumError;
use crate::server::{Command, ServerState};

/// Drop guard that reports the disconnect when the handler exits.
///
/// Fires on every exit path, including errors and panics. Since `Drop`
/// is synchronous, the send happens in a fire-and-forget task.
struct DisconnectGuard {
    conn: ConnectionId,
    commands: mpsc::Sender<Command>,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let conn = self.conn;
        let commands = self.commands.clone();
        tokio::spawn(async move {
            let _ = commands.send(Command::Disconnect { conn }).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), PodiumError> {
    let conn_id = conn.id();
    tracing::info!(conn = %conn_id, "connection opened");

    let (outbound, mut notifications) = mpsc::unbounded_channel();
    state
        .commands
        .send(Command::Connect {
            conn: conn_id,
            sender: outbound.clone(),
        })
        .await
        .map_err(|_| PodiumError::CoordinatorUnavailable)?;
    let _guard = DisconnectGuard {
        conn: conn_id,
        commands: state.commands.clone(),
    };

    let mut seq: u64 = 1;

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let data = match inbound {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(conn = %conn_id, "connection closed");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(conn = %conn_id, error = %e, "recv error");
                        break;
                    }
                };

                match decode_event(&state.codec, &data) {
                    Ok(event) => {
                        state
                            .commands
                            .send(Command::Event { conn: conn_id, event })
                            .await
                            .map_err(|_| PodiumError::CoordinatorUnavailable)?;
                    }
                    Err(e) => {
                        tracing::debug!(conn = %conn_id, error = %e, "rejected frame");
                        // Queued behind pending notifications to keep seq order.
                        let _ = outbound.send(ServerEvent::Error(e.to_string()));
                    }
                }
            }
            Some(event) = notifications.recv() => {
                send_event(&conn, &state, &mut seq, event).await?;
            }
        }
    }

    // _guard drops here → coordinator disconnect fires.
    Ok(())
}

/// Decodes a frame and applies payload validation.
fn decode_event(
    codec: &impl Codec,
    data: &[u8],
) -> Result<ClientEvent, ProtocolError> {
    let envelope: ClientEnvelope = codec.decode(data)?;
    envelope.payload.validated()
}

/// Wraps a notification in an envelope and writes it to the socket.
async fn send_event<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    seq: &mut u64,
    event: ServerEvent,
) -> Result<(), PodiumError> {
    let envelope = Envelope {
        seq: next_seq(seq),
        timestamp: state.elapsed_ms(),
        payload: event,
    };
    let bytes = state.codec.encode(&envelope)?;

    match std::str::from_utf8(&bytes) {
        Ok(text) if state.codec.is_text() => conn.send_text(text).await?,
        _ => conn.send(&bytes).await?,
    }
    Ok(())
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}

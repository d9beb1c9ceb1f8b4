//! Transport abstraction layer for Podium.
//!
//! Provides the [`Transport`] and [`Connection`] traits so the session
//! layer never touches sockets directly, plus the [`ConnectionId`] that
//! identifies a participant everywhere above this crate.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    HANDSHAKE_TIMEOUT, PendingWebSocket, WebSocketConnection, WebSocketTransport,
};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a connection.
///
/// A connection is also the identity of the player behind it: there are
/// no accounts, so the id doubles as the player id on the wire. It
/// serializes as a bare number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
///
/// Accepting is split in two: [`accept`](Transport::accept) only takes the
/// raw socket off the listener, and [`Handshake::handshake`] finishes the
/// protocol upgrade. Callers run the handshake off the accept loop so one
/// slow peer can't hold up everyone behind it.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;
    /// An accepted socket whose handshake hasn't run yet.
    type Pending: Handshake<Connection = Self::Connection, Error = Self::Error>;

    /// Waits for and accepts the next incoming socket.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;
}

/// The second half of accepting a connection.
pub trait Handshake: Send + 'static {
    /// The connection produced once the handshake succeeds.
    type Connection: Connection;
    /// The error type for a failed handshake.
    type Error: std::error::Error + Send + Sync;

    /// Completes the upgrade, yielding a ready connection.
    async fn handshake(self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive bytes.
///
/// Sending and receiving may happen concurrently from the same task
/// (e.g. inside `tokio::select!`); implementations must not let a pending
/// `recv` block a `send`.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends binary data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Sends a UTF-8 text message to the remote peer.
    ///
    /// Defaults to sending the bytes of `text`. Transports with distinct
    /// text framing (WebSocket) override this.
    async fn send_text(&self, text: &str) -> Result<(), Self::Error> {
        self.send(text.as_bytes()).await
    }

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&ConnectionId::new(12)).unwrap();
        assert_eq!(json, "12");
        let back: ConnectionId = serde_json::from_str("12").unwrap();
        assert_eq!(back, ConnectionId::new(12));
    }

    #[test]
    fn test_connection_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ConnectionId::new(1), "alice");
        map.insert(ConnectionId::new(2), "bob");
        assert_eq!(map[&ConnectionId::new(1)], "alice");
    }
}

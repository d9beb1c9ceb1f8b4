//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, Handshake, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<TcpStream>;

/// How long a peer gets to send its upgrade request.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
    handshake_timeout: Duration,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self {
            listener,
            handshake_timeout: HANDSHAKE_TIMEOUT,
        })
    }

    /// Overrides [`HANDSHAKE_TIMEOUT`] for sockets accepted from now on.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Returns the address the listener is bound to.
    ///
    /// Useful after binding to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;
    type Pending = PendingWebSocket;

    async fn accept(&mut self) -> Result<Self::Pending, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::trace!(%addr, "accepted TCP socket");
        Ok(PendingWebSocket {
            stream,
            addr,
            timeout: self.handshake_timeout,
        })
    }
}

/// A TCP socket waiting for its WebSocket upgrade.
pub struct PendingWebSocket {
    stream: TcpStream,
    addr: SocketAddr,
    timeout: Duration,
}

impl PendingWebSocket {
    /// The peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Handshake for PendingWebSocket {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn handshake(self) -> Result<Self::Connection, Self::Error> {
        let ws = tokio::time::timeout(
            self.timeout,
            tokio_tungstenite::accept_async(self.stream),
        )
        .await
        .map_err(|_| TransportError::Handshake("timed out".to_owned()))?
        .map_err(|e| TransportError::Handshake(e.to_string()))?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, addr = %self.addr, "accepted WebSocket connection");

        let (writer, reader) = ws.split();
        Ok(WebSocketConnection {
            id,
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
        })
    }
}

/// A single WebSocket connection.
///
/// The stream is split so a task parked in [`recv`](Connection::recv)
/// never holds the lock a server push needs.
pub struct WebSocketConnection {
    id: ConnectionId,
    writer: Mutex<SplitSink<WsStream, Message>>,
    reader: Mutex<SplitStream<WsStream>>,
}

impl WebSocketConnection {
    async fn write(&self, msg: Message) -> Result<(), TransportError> {
        self.writer
            .lock()
            .await
            .send(msg)
            .await
            .map_err(TransportError::send)
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.write(Message::Binary(data.to_vec().into())).await
    }

    async fn send_text(&self, text: &str) -> Result<(), Self::Error> {
        self.write(Message::Text(text.to_owned().into())).await
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut reader = self.reader.lock().await;
        loop {
            match reader.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .close()
            .await
            .map_err(TransportError::send)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

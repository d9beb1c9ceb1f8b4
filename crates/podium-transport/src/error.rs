/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The WebSocket upgrade handshake was rejected.
    #[error("websocket handshake failed: {0}")]
    Handshake(String),
}

impl TransportError {
    /// Wraps any displayable error as a broken-pipe send failure.
    #[cfg(feature = "websocket")]
    pub(crate) fn send<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::SendFailed(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            err,
        ))
    }
}

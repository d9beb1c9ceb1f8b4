//! Unified error type for the Podium server.

use podium_lobby::LobbyError;
use podium_protocol::ProtocolError;
use podium_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so the
/// `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PodiumError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A lobby rule was violated.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// The coordinator task has stopped and can't accept commands.
    #[error("coordinator is no longer running")]
    CoordinatorUnavailable,
}

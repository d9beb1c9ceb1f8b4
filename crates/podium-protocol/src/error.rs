//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means "the bytes were wrong": they could not be
//! encoded, decoded, or they decoded into something that breaks a protocol
//! rule. Lobby rule violations (not your turn, and so on) live in the lobby
//! crate.

/// Errors that can occur in the protocol layer.
///
/// The `Display` text is sent verbatim to the client in an `error`
/// notification, so it should read well to a player.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, unknown event, missing or
    /// mistyped field.
    #[cfg(feature = "json")]
    #[error("invalid message: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but violates a protocol rule (e.g. a blank
    /// display name).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

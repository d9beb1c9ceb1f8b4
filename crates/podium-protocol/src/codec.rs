//! Codec trait and implementations for serializing/deserializing frames.
//!
//! A codec converts between [`Envelope`](crate::Envelope)s and raw bytes.
//! The server loop only talks to the [`Codec`] trait, so the format can be
//! swapped without touching connection handling.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;

    /// Whether encoded output is UTF-8 text.
    ///
    /// Text codecs are sent as WebSocket text frames so browsers receive a
    /// string instead of a `Blob`.
    fn is_text(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is the codec browser clients speak. It is behind the `json`
/// feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use podium_protocol::{ClientEnvelope, ClientEvent, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let frame = br#"{"payload":{"event":"join-game","data":"Robin"}}"#;
///
/// let envelope: ClientEnvelope = codec.decode(frame).unwrap();
/// assert_eq!(envelope.payload, ClientEvent::JoinGame("Robin".into()));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }

    fn is_text(&self) -> bool {
        true
    }
}

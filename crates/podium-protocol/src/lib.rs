//! Wire protocol for Podium.
//!
//! This crate defines the "language" clients and the server speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`Envelope`], views) —
//!   the lobby events that travel on the wire.
//! - **Validation** ([`ClientEvent::validated`]) — semantic checks applied
//!   before an event may touch lobby state.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how frames become bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong on the way.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope<ClientEvent>) → Session (lobbies)
//! ```
//!
//! The protocol layer knows nothing about lobbies or turn order; it only
//! guarantees that whatever reaches the session layer is well formed.

mod codec;
mod error;
mod types;
mod validate;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEnvelope, ClientEvent, ConnectionId, Envelope, LobbyId,
    MAX_DISPLAY_NAME_LEN, PlayerView, ScoreEntry, ServerEnvelope,
    ServerEvent, WinnerView,
};
pub use validate::display_name;

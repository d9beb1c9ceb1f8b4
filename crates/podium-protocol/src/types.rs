//! Core protocol types for Podium's wire format.
//!
//! Everything in this module travels over the socket. Inbound traffic is a
//! [`ClientEvent`], outbound traffic is a [`ServerEvent`], and both ride
//! inside an [`Envelope`] that carries sequencing metadata.
//!
//! The event names and payload shapes mirror the browser client's
//! vocabulary (`join-game`, `next-turn`, `lobbyId`, `isHost`, ...), so the
//! serde attributes here are part of the contract, not decoration.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use podium_transport::ConnectionId;

/// Longest display name (in characters) a player may register.
pub const MAX_DISPLAY_NAME_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a lobby (one match instance).
///
/// Newtype over `u64` so a lobby id can never be confused with a
/// [`ConnectionId`]. `#[serde(transparent)]` keeps it a bare number on the
/// wire: `LobbyId(3)` is just `3`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct LobbyId(pub u64);

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// A player as shown in lobby membership lists.
///
/// `#[serde(rename_all = "camelCase")]` turns `is_host` into `isHost`,
/// which is what JavaScript clients expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: ConnectionId,
    pub name: String,
    pub score: i64,
    pub is_host: bool,
}

/// One row of a score snapshot.
///
/// Snapshots always list every current player in turn order. Clients sort
/// by score themselves for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: ConnectionId,
    pub name: String,
    pub score: i64,
}

/// Identity of the winning player in a `game-over` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerView {
    pub id: ConnectionId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// ClientEvent — client → server
// ---------------------------------------------------------------------------

/// Requests a client can send.
///
/// `#[serde(tag = "event", content = "data")]` produces "adjacently tagged"
/// JSON, one object per event:
///
/// ```text
/// { "event": "join-game",      "data": "Alice" }
/// { "event": "start-game",     "data": 3 }
/// { "event": "submit-outcome", "data": { "lobbyId": 3, "outcomeValue": 8 } }
/// { "event": "leave-lobby" }
/// ```
///
/// `rename_all` renames the variants (`JoinGame` → `join-game`) and
/// `rename_all_fields` renames the fields inside struct variants
/// (`outcome_value` → `outcomeValue`).
///
/// The implicit disconnect is not an event: the transport reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Join the first open lobby (or a fresh one) under this display name.
    JoinGame(String),

    /// Host only: start the match in this lobby.
    StartGame(LobbyId),

    /// Report the outcome of the sender's turn.
    ///
    /// `outcome_value` is an integer. A fractional number (`7.5`), a
    /// string, or anything outside `i64` fails to decode; it is never
    /// rounded or coerced.
    SubmitOutcome {
        lobby_id: LobbyId,
        outcome_value: i64,
    },

    /// Leave the current lobby. A no-op when not in one.
    LeaveLobby,
}

impl ClientEvent {
    /// Short, stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinGame(_) => "join-game",
            Self::StartGame(_) => "start-game",
            Self::SubmitOutcome { .. } => "submit-outcome",
            Self::LeaveLobby => "leave-lobby",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent — server → client
// ---------------------------------------------------------------------------

/// Notifications the server pushes to clients.
///
/// Same adjacently tagged layout as [`ClientEvent`]. Unit variants carry no
/// `data` key at all: `{ "event": "host-assigned" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// To the joining connection: which lobby it landed in, its own id,
    /// and the membership at the time of joining.
    LobbyJoined {
        lobby_id: LobbyId,
        player_id: ConnectionId,
        players: Vec<PlayerView>,
    },

    /// To everyone in the lobby: membership changed.
    LobbyUpdate(Vec<PlayerView>),

    /// To the newly designated host only.
    HostAssigned,

    /// To everyone in the lobby: the host pressed start.
    GameStarting,

    /// To everyone in the lobby: the first turn belongs to `current_player`.
    GameStart { current_player: ConnectionId },

    /// To everyone in the lobby after every turn change.
    NextTurn {
        current_player: ConnectionId,
        scores: Vec<ScoreEntry>,
        round: u32,
    },

    /// To everyone in the lobby: the match is over.
    GameOver {
        winner: WinnerView,
        scores: Vec<ScoreEntry>,
    },

    /// To the offending connection only: a request was rejected.
    Error(String),
}

impl ServerEvent {
    /// Short, stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LobbyJoined { .. } => "lobby-joined",
            Self::LobbyUpdate(_) => "lobby-update",
            Self::HostAssigned => "host-assigned",
            Self::GameStarting => "game-starting",
            Self::GameStart { .. } => "game-start",
            Self::NextTurn { .. } => "next-turn",
            Self::GameOver { .. } => "game-over",
            Self::Error(_) => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope — the top-level wire format
// ---------------------------------------------------------------------------

/// The top-level frame. Every message on the wire is an `Envelope`.
///
/// ```text
/// { "seq": 4, "timestamp": 1532, "payload": { "event": "next-turn", "data": { ... } } }
/// ```
///
/// The server numbers its envelopes per connection starting at 1 and stamps
/// them with milliseconds since the server started. Clients may omit both
/// fields; `#[serde(default)]` fills in 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<P> {
    /// Per-connection sequence number.
    #[serde(default)]
    pub seq: u64,

    /// Milliseconds since the server started (0 from clients).
    #[serde(default)]
    pub timestamp: u64,

    /// The event itself.
    pub payload: P,
}

/// A frame sent by a client.
pub type ClientEnvelope = Envelope<ClientEvent>;

/// A frame sent by the server.
pub type ServerEnvelope = Envelope<ServerEvent>;

// =========================================================================
// Tests
// =========================================================================

//! Error types for the lobby layer.

use std::fmt;

use podium_protocol::LobbyId;

/// Errors that can occur during lobby operations.
///
/// The first four variants are the user-facing rejection taxonomy. Their
/// `Display` text is what the offending connection sees in its `error`
/// notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// The connection already belongs to a lobby.
    #[error("You are already in a lobby")]
    AlreadyInLobby,

    /// `start-game` was refused.
    #[error("Unable to start the game: {0}")]
    CannotStart(StartRejection),

    /// An outcome was submitted by someone who doesn't hold the turn.
    #[error("It's not your turn")]
    NotYourTurn,

    /// An outcome was submitted while no match is running.
    #[error("Game not in progress")]
    GameNotInProgress,

    /// The lobby is full or running a match.
    #[error("lobby {0} is not accepting players")]
    LobbyUnavailable(LobbyId),

    /// The lobby does not exist.
    #[error("lobby {0} not found")]
    NotFound(LobbyId),

    /// Only empty lobbies may be removed.
    #[error("lobby {0} still has players")]
    NotEmpty(LobbyId),
}

/// Why a `start-game` request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRejection {
    /// No lobby has the requested id.
    UnknownLobby,
    /// A match is already running.
    AlreadyRunning,
    /// The requester is not the host.
    NotHost,
    /// Too few players to start.
    NotEnoughPlayers { have: usize, need: usize },
}

impl fmt::Display for StartRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLobby => write!(f, "no such lobby"),
            Self::AlreadyRunning => write!(f, "the game is already running"),
            Self::NotHost => write!(f, "only the host can start the game"),
            Self::NotEnoughPlayers { have, need } => {
                write!(f, "need at least {need} players, have {have}")
            }
        }
    }
}

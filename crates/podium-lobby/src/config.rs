//! Lobby configuration and status state machine.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fewest players a match can continue with. Dropping below this while a
/// match is running ends it on the spot.
pub const MIN_ACTIVE_PLAYERS: usize = 2;

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// Rules shared by every lobby in a directory.
///
/// `#[serde(default)]` lets a partial config (say, only `round_limit`)
/// fill the rest from [`LobbyConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    /// Maximum players per lobby.
    pub capacity: usize,

    /// Players required before the host may start.
    pub min_players: usize,

    /// Number of full rotations in a match.
    pub round_limit: u32,

    /// How the turn pointer is repaired when a player leaves mid-match.
    pub departure_policy: DeparturePolicy,

    /// How long a player may hold the turn. `None` waits forever.
    ///
    /// An expired turn removes the player exactly as a disconnect would.
    pub turn_timeout: Option<Duration>,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            min_players: 2,
            round_limit: 3,
            departure_policy: DeparturePolicy::default(),
            turn_timeout: None,
        }
    }
}

impl LobbyConfig {
    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// Called by [`LobbyDirectory::new`](crate::LobbyDirectory::new).
    /// Rules:
    /// - `min_players` is at least [`MIN_ACTIVE_PLAYERS`].
    /// - `capacity` is at least `min_players`.
    /// - `round_limit` is at least 1.
    /// - a zero `turn_timeout` is treated as no timeout.
    pub fn validated(mut self) -> Self {
        if self.min_players < MIN_ACTIVE_PLAYERS {
            tracing::warn!(
                min_players = self.min_players,
                floor = MIN_ACTIVE_PLAYERS,
                "min_players below floor, clamping"
            );
            self.min_players = MIN_ACTIVE_PLAYERS;
        }
        if self.capacity < self.min_players {
            tracing::warn!(
                capacity = self.capacity,
                min_players = self.min_players,
                "capacity below min_players, raising"
            );
            self.capacity = self.min_players;
        }
        if self.round_limit == 0 {
            tracing::warn!("round_limit is 0, using 1");
            self.round_limit = 1;
        }
        if self.turn_timeout == Some(Duration::ZERO) {
            tracing::warn!("turn_timeout of zero disables the timeout");
            self.turn_timeout = None;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// DeparturePolicy
// ---------------------------------------------------------------------------

/// What happens to the turn pointer when a player leaves a running match
/// and at least two players remain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DeparturePolicy {
    /// The turn goes to whoever would have played next had the departed
    /// player never been there. A departure never changes the round by
    /// itself; the round only advances if the departed player was the
    /// last in the rotation and held the turn, which completes the
    /// rotation.
    #[default]
    RecomputeNext,

    /// Legacy turn repair: run a plain turn advance after the removal.
    /// Depending on where the departed player sat relative to the pointer
    /// this can skip a player's turn.
    AdvanceTurn,
}

// ---------------------------------------------------------------------------
// LobbyStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a lobby.
///
/// ```text
///            start            rounds exhausted / < 2 players
/// Forming ─────────→ InProgress ─────────────────────────→ Finished
///                        ↑                                     │
///                        └──────────── start (rematch) ────────┘
/// ```
///
/// The round lives inside the variants, so "in progress at round 0" can't
/// be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum LobbyStatus {
    /// Gathering players; no match has been played yet.
    Forming,

    /// A match is running. `round` is within `1..=round_limit`.
    InProgress { round: u32 },

    /// The last match ended. `round` is where the counter stopped:
    /// `round_limit + 1` after a full match, lower after a forced end.
    Finished { round: u32 },
}

impl LobbyStatus {
    /// Returns `true` while a match is running.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress { .. })
    }

    /// The round counter: 0 before the first match.
    pub fn round(&self) -> u32 {
        match self {
            Self::Forming => 0,
            Self::InProgress { round } | Self::Finished { round } => *round,
        }
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Forming | Self::Finished { .. }, Self::InProgress { round }) => {
                round == 1
            }
            (Self::InProgress { round: from }, Self::InProgress { round: to }) => {
                to == from + 1
            }
            (Self::InProgress { round: from }, Self::Finished { round: to }) => {
                to == from || to == from + 1
            }
            _ => false,
        }
    }
}

impl fmt::Display for LobbyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forming => write!(f, "Forming"),
            Self::InProgress { round } => write!(f, "InProgress(round {round})"),
            Self::Finished { round } => write!(f, "Finished(round {round})"),
        }
    }
}
